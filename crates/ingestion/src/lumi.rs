//! Recorded-luminosity bookkeeping.
//!
//! Loads the by-section luminosity CSV once before aggregation and answers
//! `(run, section)` lookups during the pass.

use jetspec_core::{Error, LumiKey, Result, RunId, SectionId};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Exact header the luminosity CSV must carry.
pub const LUMI_CSV_HEADER: &str =
    "Run:Fill,LS,UTCTime,Beam Status,E(GeV),Delivered(/ub),Recorded(/ub),avgPU";

/// Approximate length of one luminosity section in seconds.
const SECONDS_PER_SECTION: f64 = 23.3;

/// Recorded luminosity per `(run, section)`, in inverse picobarns.
#[derive(Debug, Clone, Default)]
pub struct LuminosityLedger {
    lums: HashMap<LumiKey, f64>,
}

impl LuminosityLedger {
    /// Create an empty ledger (used for simulation, where no luminosity
    /// normalization applies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record luminosity for one section, in pb^-1.
    pub fn insert(&mut self, run: RunId, section: SectionId, recorded_pb: f64) {
        self.lums.insert((run, section), recorded_pb);
    }

    /// Recorded luminosity for a section, or `None` when the feed carries no
    /// entry for it. Absence is meaningful to callers: it is the one
    /// anomaly that does not abort a pass.
    pub fn lookup(&self, run: RunId, section: SectionId) -> Option<f64> {
        self.lums.get(&(run, section)).copied()
    }

    /// Number of sections in the ledger.
    pub fn section_count(&self) -> usize {
        self.lums.len()
    }

    /// Number of distinct runs in the ledger.
    pub fn run_count(&self) -> usize {
        let mut runs: Vec<RunId> = self.lums.keys().map(|&(run, _)| run).collect();
        runs.sort_unstable();
        runs.dedup();
        runs.len()
    }

    /// Total recorded luminosity over all sections, in pb^-1.
    pub fn total_recorded(&self) -> f64 {
        self.lums.values().sum()
    }

    /// Load a ledger from the luminosity CSV at `path` and log a summary.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let ledger = Self::from_reader(BufReader::new(file))?;

        info!(
            file = %path.display(),
            runs = ledger.run_count(),
            sections = ledger.section_count(),
            recorded_pb = ledger.total_recorded(),
            hours = ledger.section_count() as f64 * SECONDS_PER_SECTION / 3600.0,
            "loaded luminosity ledger"
        );

        Ok(ledger)
    }

    /// Parse the luminosity CSV from any buffered reader.
    ///
    /// The header must match [`LUMI_CSV_HEADER`] exactly; each following row
    /// is `run:fill,ls:ls,time,beam status,E,delivered,recorded,avgPU` with
    /// the recorded column in ub^-1, converted here to pb^-1.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(Error::config("luminosity feed is empty")),
        };
        if header.trim_end_matches('\r') != LUMI_CSV_HEADER {
            return Err(Error::config(format!(
                "unexpected luminosity feed header: {header:?}"
            )));
        }

        let mut ledger = Self::new();
        for (lineno, line) in lines.enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            // Header is line 1
            let lineno = lineno + 2;
            let (run, section, recorded_ub) = parse_lumi_line(line)
                .ok_or_else(|| Error::config(format!("malformed luminosity feed line {lineno}: {line:?}")))?;
            ledger.insert(run, section, recorded_ub * 1e-6);
        }

        Ok(ledger)
    }
}

/// Parse one data row into (run, section, recorded ub^-1).
fn parse_lumi_line(line: &str) -> Option<(RunId, SectionId, f64)> {
    let mut fields = line.split(',');

    let run_fill = fields.next()?;
    let run = run_fill.split(':').next()?.trim().parse().ok()?;

    let ls_pair = fields.next()?;
    let section = ls_pair.split(':').next()?.trim().parse().ok()?;

    // UTCTime, beam status, E(GeV), delivered
    let recorded = fields.nth(4)?;
    let recorded_ub = recorded.trim().parse().ok()?;

    Some((run, section, recorded_ub))
}
