//! Single-pass event aggregation.
//!
//! Routes each event into the histogram sets of every fired trigger,
//! applying the prescale, rapidity-window, and reconstruction-cut rules.
//! All arithmetic is commutative and associative, so shard replicas of the
//! aggregator can process disjoint slices of the feed and be merged once at
//! the end.

use crate::histogram_set::{HistogramSet, LumiAccrual, SpectrumRecord};
use jetspec_core::{AnalysisConfig, DatasetKind, Error, EventRecord, LumiKey, Result};
use jetspec_ingestion::{EventSource, LuminosityLedger};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Counters accumulated over one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationStats {
    /// Events processed.
    pub events: u64,
    /// Raw-spectrum fills across all sets.
    pub raw_fills: u64,
    /// Generator-spectrum fills across all sets.
    pub generator_fills: u64,
}

/// Drives one pass over the event feed, mutating the histogram sets.
pub struct EventAggregator {
    dataset: DatasetKind,
    reco_pt_min: f64,
    max_events: Option<u64>,
    /// Stable trigger-name list from the first event record.
    trigger_names: Vec<String>,
    /// Histogram-set indices per trigger slot; empty for triggers without a
    /// configured phase space.
    sets_by_trigger: Vec<Vec<usize>>,
    sets: Vec<HistogramSet>,
    ledger: Arc<LuminosityLedger>,
    /// Distinct sections encountered with no ledger record.
    missing_keys: HashSet<LumiKey>,
    cancel: Arc<AtomicBool>,
    stats: AggregationStats,
}

impl EventAggregator {
    /// Build the histogram sets for the configured regions crossed with the
    /// triggers observed in the first event record.
    ///
    /// Observed triggers without a configured phase space get no sets and a
    /// warning; so do configured triggers the feed never mentions.
    pub fn new(
        config: &AnalysisConfig,
        trigger_names: &[String],
        ledger: Arc<LuminosityLedger>,
    ) -> Result<Self> {
        let is_simulation = config.dataset.is_simulation();
        let mut sets = Vec::new();
        let mut sets_by_trigger = Vec::with_capacity(trigger_names.len());

        for name in trigger_names {
            let Some(phase_space) = config.triggers.iter().find(|t| &t.name == name) else {
                warn!(trigger = %name, "observed trigger has no configured phase space, skipping");
                sets_by_trigger.push(Vec::new());
                continue;
            };

            let mut indices = Vec::with_capacity(config.regions.len());
            for &region in &config.regions {
                indices.push(sets.len());
                sets.push(HistogramSet::new(phase_space, region, is_simulation)?);
            }
            sets_by_trigger.push(indices);
        }

        for configured in &config.triggers {
            if !trigger_names.contains(&configured.name) {
                warn!(trigger = %configured.name, "configured trigger not present in event feed");
            }
        }

        Ok(Self {
            dataset: config.dataset,
            reco_pt_min: config.spectra.reco_pt_min,
            max_events: config.input.max_events,
            trigger_names: trigger_names.to_vec(),
            sets_by_trigger,
            sets,
            ledger,
            missing_keys: HashSet::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            stats: AggregationStats::default(),
        })
    }

    /// Handle for cancelling the pass from another thread; checked between
    /// events, and nothing is committed on cancellation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Counters for the pass so far.
    pub fn stats(&self) -> AggregationStats {
        self.stats
    }

    /// Histogram sets, in (trigger, region) construction order.
    pub fn sets(&self) -> &[HistogramSet] {
        &self.sets
    }

    /// Distinct sections encountered with no ledger record.
    pub fn missing_section_count(&self) -> u64 {
        self.missing_keys.len() as u64
    }

    /// Consume the feed until exhaustion, cancellation, or the event cap.
    pub fn run<S: EventSource>(&mut self, source: &mut S) -> Result<()> {
        while let Some(event) = source.next_event()? {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            if let Some(cap) = self.max_events {
                if self.stats.events >= cap {
                    break;
                }
            }
            self.process_event(&event)?;
        }
        Ok(())
    }

    /// Route one event into every applicable histogram set.
    pub fn process_event(&mut self, event: &EventRecord) -> Result<()> {
        self.stats.events += 1;

        let is_data = self.dataset.is_data();
        let fill_weight = if is_data { 1.0 } else { event.weight };

        for slot in 0..self.trigger_names.len() {
            let fired = event.fired.get(slot).copied().unwrap_or(false);
            if !fired {
                continue;
            }

            let name = &self.trigger_names[slot];
            let prescale = event.prescales.get(slot).copied().ok_or_else(|| {
                Error::data_integrity(format!(
                    "no prescale for fired trigger {name} in run {}",
                    event.run
                ))
            })?;
            // A fired trigger with prescale zero would fabricate an
            // undefined weight; abort before touching any set.
            if prescale == 0 {
                return Err(Error::data_integrity(format!(
                    "prescale zero for trigger {name} in run {}",
                    event.run
                )));
            }

            let recorded = self.ledger.lookup(event.run, event.section);

            for &index in &self.sets_by_trigger[slot] {
                let set = &mut self.sets[index];

                // One luminosity contribution per section per set, no
                // matter how many jets the event lands in this region.
                if is_data {
                    let accrual =
                        set.accrue_luminosity(event.run, event.section, recorded, prescale);
                    if accrual == LumiAccrual::MissingRecord {
                        self.missing_keys.insert((event.run, event.section));
                    }
                }

                for jet in &event.jets {
                    if jet.pt <= self.reco_pt_min {
                        continue;
                    }
                    let y_abs = jet.rapidity().abs();
                    if !set.region().contains_abs(y_abs) {
                        continue;
                    }
                    set.fill_raw(jet.pt, fill_weight);
                    if is_data {
                        set.fill_prescaled(jet.pt, prescale as f64);
                    }
                    self.stats.raw_fills += 1;
                }

                // Truth fills apply the rapidity window only, never the
                // reconstruction cut.
                if !is_data {
                    for jet in &event.gen_jets {
                        if set.region().contains_abs(jet.rapidity().abs()) {
                            set.fill_generator(jet.pt, event.weight);
                            self.stats.generator_fills += 1;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Merge a shard replica built with the same configuration.
    pub fn merge(&mut self, other: EventAggregator) -> Result<()> {
        if self.trigger_names != other.trigger_names || self.sets.len() != other.sets.len() {
            return Err(Error::config(
                "cannot merge aggregators with different setups",
            ));
        }
        for (set, other_set) in self.sets.iter_mut().zip(other.sets) {
            set.merge(other_set)?;
        }
        self.missing_keys.extend(other.missing_keys);
        self.stats.events += other.stats.events;
        self.stats.raw_fills += other.stats.raw_fills;
        self.stats.generator_fills += other.stats.generator_fills;
        Ok(())
    }

    /// Finalize every set, consuming the aggregator.
    pub fn finalize(self) -> Vec<SpectrumRecord> {
        self.sets.into_iter().map(HistogramSet::finalize).collect()
    }
}
