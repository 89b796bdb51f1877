//! End-to-end driver for the spectrum aggregation stage.
//!
//! Sequences one pass: validate the output location, load the luminosity
//! ledger, discover the trigger list from the first event, aggregate, then
//! finalize and commit. Fatal errors abort before anything is committed.

use crate::store::SpectrumStore;
use anyhow::Context;
use jetspec_core::{AnalysisConfig, Result};
use jetspec_ingestion::{EventSource, JsonLinesSource, LuminosityLedger};
use jetspec_spectra::EventAggregator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSummary {
    /// Events processed.
    pub events: u64,
    /// Raw-spectrum fills across all sets.
    pub raw_fills: u64,
    /// Generator-spectrum fills across all sets.
    pub generator_fills: u64,
    /// Distinct sections with no luminosity record.
    pub missing_sections: u64,
    /// Number of (region, trigger) spectra produced.
    pub spectrum_count: usize,
    /// Where the document was committed, when the stage ran.
    pub output_path: Option<PathBuf>,
}

/// Drives the aggregation stage for one configuration.
pub struct AnalysisRunner {
    config: AnalysisConfig,
}

impl AnalysisRunner {
    /// Create a runner for one immutable configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The configuration this runner was built with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run over the event feed configured in `input.events_file`.
    pub fn run_configured_feed(&self) -> anyhow::Result<AnalysisSummary> {
        let path = self
            .config
            .input
            .events_file
            .as_ref()
            .context("no event feed configured")?;
        let mut source = JsonLinesSource::open(path)
            .with_context(|| format!("opening event feed {}", path.display()))?;
        Ok(self.run(&mut source)?)
    }

    /// Run over an already-open event source.
    pub fn run<S: EventSource>(&self, source: &mut S) -> Result<AnalysisSummary> {
        if !self.config.spectra.enabled {
            info!("spectrum aggregation stage disabled");
            return Ok(AnalysisSummary::default());
        }

        // Fail on a bad output location before reading any event
        let store = SpectrumStore::create(&self.config.output.path)?;
        let ledger = Arc::new(self.load_ledger()?);
        let stage = &self.config.spectra.stage;

        let first = match source.next_event()? {
            Some(event) if self.config.input.max_events != Some(0) => event,
            _ => {
                warn!("no events to process");
                store.commit(stage, Vec::new())?;
                return Ok(AnalysisSummary {
                    output_path: Some(store.path().to_path_buf()),
                    ..AnalysisSummary::default()
                });
            }
        };

        // The trigger-name list is fixed by the first record
        let mut aggregator = EventAggregator::new(&self.config, &first.trigger_names, ledger)?;
        aggregator.process_event(&first)?;
        aggregator.run(source)?;

        let stats = aggregator.stats();
        let missing_sections = aggregator.missing_section_count();
        if missing_sections > 0 {
            warn!(
                sections = missing_sections,
                "sections without a luminosity record contributed zero"
            );
        }

        let records = aggregator.finalize();
        let spectrum_count = records.len();
        store.commit(stage, records)?;

        info!(
            events = stats.events,
            raw_fills = stats.raw_fills,
            spectra = spectrum_count,
            "aggregation pass complete"
        );

        Ok(AnalysisSummary {
            events: stats.events,
            raw_fills: stats.raw_fills,
            generator_fills: stats.generator_fills,
            missing_sections,
            spectrum_count,
            output_path: Some(store.path().to_path_buf()),
        })
    }

    /// Luminosity ledger for this pass: loaded from the feed for data when
    /// bookkeeping is enabled, empty otherwise.
    fn load_ledger(&self) -> Result<LuminosityLedger> {
        if !self.config.dataset.is_data() || !self.config.luminosity.enabled {
            return Ok(LuminosityLedger::new());
        }
        match &self.config.luminosity.file {
            Some(path) => LuminosityLedger::load(path),
            None => {
                warn!("luminosity bookkeeping enabled but no feed configured");
                Ok(LuminosityLedger::new())
            }
        }
    }
}
