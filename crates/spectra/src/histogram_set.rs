//! Per-(region, trigger) spectrum state.
//!
//! One `HistogramSet` owns the four accumulators for a single rapidity
//! region under a single trigger, plus the luminosity dedup state that
//! guarantees each `(run, section)` contributes to the sum at most once.

use crate::accumulator::BinnedAccumulator;
use crate::binning;
use jetspec_core::{Error, LumiKey, Region, Result, RunId, SectionId, TriggerPhaseSpace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of one luminosity accrual attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LumiAccrual {
    /// First sighting of this section; its effective luminosity was added.
    Recorded(f64),
    /// First sighting, but the ledger has no entry for the section.
    /// The key is marked seen with zero contribution.
    MissingRecord,
    /// Section already counted; no-op.
    AlreadyCounted,
}

/// Finalized spectra for one (region, trigger) pair, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecord {
    /// Trigger identifier.
    pub trigger: String,
    /// Rapidity region.
    pub region: Region,
    /// Nominal trigger threshold in GeV.
    pub threshold: f64,
    /// Lower edge of the trigger's efficient pT range.
    pub pt_min: f64,
    /// Upper edge of the trigger's efficient pT range.
    pub pt_max: f64,
    /// Whether the input was simulated.
    pub is_simulation: bool,
    /// Final effective luminosity sum in pb^-1 (1 for simulation).
    pub lumi_sum: f64,
    /// Sections encountered with no ledger entry.
    pub missing_sections: u64,
    /// Raw pT spectrum.
    pub raw: BinnedAccumulator,
    /// Prescale-weighted pT spectrum (data only).
    pub prescaled: BinnedAccumulator,
    /// Effective luminosity broadcast across the binning.
    pub luminosity: BinnedAccumulator,
    /// Unbiased generator-level spectrum (simulation only).
    pub generator: BinnedAccumulator,
}

/// Accumulators and luminosity bookkeeping for one (region, trigger) pair.
#[derive(Debug, Clone)]
pub struct HistogramSet {
    trigger: String,
    region: Region,
    threshold: f64,
    pt_min: f64,
    pt_max: f64,
    is_simulation: bool,
    raw: BinnedAccumulator,
    prescaled: BinnedAccumulator,
    luminosity: BinnedAccumulator,
    generator: BinnedAccumulator,
    /// Effective-luminosity contribution per counted section.
    counted: HashMap<LumiKey, f64>,
    /// Counted sections that had no ledger record.
    missing: HashSet<LumiKey>,
    lumi_sum: f64,
}

impl HistogramSet {
    /// Create an empty set for one region under one trigger.
    pub fn new(trigger: &TriggerPhaseSpace, region: Region, is_simulation: bool) -> Result<Self> {
        let edges = binning::edges_for(&region)?;
        Ok(Self {
            trigger: trigger.name.clone(),
            region,
            threshold: trigger.threshold,
            pt_min: trigger.pt_min,
            pt_max: trigger.pt_max,
            is_simulation,
            raw: BinnedAccumulator::new(edges.clone()),
            prescaled: BinnedAccumulator::new(edges.clone()),
            luminosity: BinnedAccumulator::new(edges.clone()),
            generator: BinnedAccumulator::new(edges),
            counted: HashMap::new(),
            missing: HashSet::new(),
            lumi_sum: 0.0,
        })
    }

    /// Trigger this set belongs to.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Rapidity region this set covers.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Running effective-luminosity sum in pb^-1.
    pub fn lumi_sum(&self) -> f64 {
        self.lumi_sum
    }

    /// Number of counted sections with no ledger record.
    pub fn missing_section_count(&self) -> u64 {
        self.missing.len() as u64
    }

    /// Raw spectrum accumulator.
    pub fn raw(&self) -> &BinnedAccumulator {
        &self.raw
    }

    /// Prescale-weighted spectrum accumulator.
    pub fn prescaled(&self) -> &BinnedAccumulator {
        &self.prescaled
    }

    /// Generator-level spectrum accumulator.
    pub fn generator(&self) -> &BinnedAccumulator {
        &self.generator
    }

    /// Add `weight` at `pt` in the raw spectrum.
    pub fn fill_raw(&mut self, pt: f64, weight: f64) {
        self.raw.fill(pt, weight);
    }

    /// Add `weight` at `pt` in the prescale-weighted spectrum (data only).
    pub fn fill_prescaled(&mut self, pt: f64, weight: f64) {
        self.prescaled.fill(pt, weight);
    }

    /// Add `weight` at `pt` in the generator-level spectrum (simulation only).
    pub fn fill_generator(&mut self, pt: f64, weight: f64) {
        self.generator.fill(pt, weight);
    }

    /// Count one luminosity section, at most once per set.
    ///
    /// Dividing the recorded luminosity by the prescale converts delivered
    /// luminosity into the effective luminosity actually sampled by this
    /// prescaled trigger. A section absent from the ledger contributes zero
    /// but remains distinguishable from one recorded as zero.
    pub fn accrue_luminosity(
        &mut self,
        run: RunId,
        section: SectionId,
        recorded: Option<f64>,
        prescale: u32,
    ) -> LumiAccrual {
        debug_assert!(prescale > 0, "prescale validated before accrual");

        let key = (run, section);
        if self.counted.contains_key(&key) {
            return LumiAccrual::AlreadyCounted;
        }

        match recorded {
            Some(recorded) => {
                let contribution = recorded / prescale as f64;
                self.counted.insert(key, contribution);
                self.lumi_sum += contribution;
                LumiAccrual::Recorded(contribution)
            }
            None => {
                self.counted.insert(key, 0.0);
                self.missing.insert(key);
                LumiAccrual::MissingRecord
            }
        }
    }

    /// Merge a shard replica of the same (region, trigger) pair.
    ///
    /// Section keys are unioned before the sum is extended, so a section
    /// seen by both shards still contributes exactly once.
    pub fn merge(&mut self, other: HistogramSet) -> Result<()> {
        if self.trigger != other.trigger || self.region != other.region {
            return Err(Error::config(format!(
                "cannot merge histogram set {}/{} into {}/{}",
                other.trigger,
                other.region.label(),
                self.trigger,
                self.region.label()
            )));
        }

        self.raw.merge(&other.raw)?;
        self.prescaled.merge(&other.prescaled)?;
        self.luminosity.merge(&other.luminosity)?;
        self.generator.merge(&other.generator)?;

        for (key, contribution) in other.counted {
            if self.counted.contains_key(&key) {
                continue;
            }
            self.counted.insert(key, contribution);
            self.lumi_sum += contribution;
            if other.missing.contains(&key) {
                self.missing.insert(key);
            }
        }
        Ok(())
    }

    /// Broadcast the final luminosity and hand over the accumulators.
    ///
    /// Data sets carry the accrued sum; simulated sets carry the sentinel
    /// `1.0`, meaning no luminosity normalization applies downstream.
    pub fn finalize(mut self) -> SpectrumRecord {
        let lumi_sum = if self.is_simulation { 1.0 } else { self.lumi_sum };
        self.luminosity.set_all(lumi_sum);

        SpectrumRecord {
            trigger: self.trigger,
            region: self.region,
            threshold: self.threshold,
            pt_min: self.pt_min,
            pt_max: self.pt_max,
            is_simulation: self.is_simulation,
            lumi_sum,
            missing_sections: self.missing.len() as u64,
            raw: self.raw,
            prescaled: self.prescaled,
            luminosity: self.luminosity,
            generator: self.generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_set(is_simulation: bool) -> HistogramSet {
        let trigger = TriggerPhaseSpace::new("jt60", 60.0, 84.0, 196.0);
        HistogramSet::new(&trigger, Region::new(0.0, 0.5), is_simulation).unwrap()
    }

    #[test]
    fn test_accrual_is_idempotent() {
        let mut set = make_set(false);

        let first = set.accrue_luminosity(1, 5, Some(2.0), 4);
        assert_eq!(first, LumiAccrual::Recorded(0.5));
        let second = set.accrue_luminosity(1, 5, Some(2.0), 4);
        assert_eq!(second, LumiAccrual::AlreadyCounted);

        assert!((set.lumi_sum() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_accrual_sums_distinct_sections() {
        let mut set = make_set(false);
        set.accrue_luminosity(1, 5, Some(2.0), 4);
        set.accrue_luminosity(1, 6, Some(3.0), 2);
        set.accrue_luminosity(2, 5, Some(1.0), 1);

        assert!((set.lumi_sum() - (0.5 + 1.5 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_record_distinct_from_zero() {
        let mut set = make_set(false);

        assert_eq!(set.accrue_luminosity(1, 1, None, 2), LumiAccrual::MissingRecord);
        assert_eq!(set.accrue_luminosity(1, 2, Some(0.0), 2), LumiAccrual::Recorded(0.0));

        assert_eq!(set.lumi_sum(), 0.0);
        assert_eq!(set.missing_section_count(), 1);

        // Both keys are now counted either way
        assert_eq!(set.accrue_luminosity(1, 1, Some(5.0), 2), LumiAccrual::AlreadyCounted);
        assert_eq!(set.lumi_sum(), 0.0);
    }

    #[test]
    fn test_finalize_broadcasts_lumi_sum_for_data() {
        let mut set = make_set(false);
        set.accrue_luminosity(1, 1, Some(4.0), 2);
        set.fill_raw(100.0, 1.0);

        let record = set.finalize();
        assert!(!record.is_simulation);
        assert!((record.lumi_sum - 2.0).abs() < 1e-12);
        for bin in 0..record.luminosity.bin_count() {
            assert_eq!(record.luminosity.content(bin), 2.0);
        }
        assert_eq!(record.raw.integral(), 1.0);
    }

    #[test]
    fn test_finalize_uses_sentinel_for_simulation() {
        let set = make_set(true);
        let record = set.finalize();

        assert!(record.is_simulation);
        assert_eq!(record.lumi_sum, 1.0);
        for bin in 0..record.luminosity.bin_count() {
            assert_eq!(record.luminosity.content(bin), 1.0);
        }
    }

    #[test]
    fn test_merge_unions_sections_before_summing() {
        let mut a = make_set(false);
        let mut b = make_set(false);

        // Section (1,1) lands in both shards; (1,2) only in b
        a.accrue_luminosity(1, 1, Some(2.0), 2);
        b.accrue_luminosity(1, 1, Some(2.0), 2);
        b.accrue_luminosity(1, 2, Some(4.0), 2);

        a.fill_raw(100.0, 1.0);
        b.fill_raw(100.0, 1.0);

        a.merge(b).unwrap();
        assert!((a.lumi_sum() - 3.0).abs() < 1e-12);
        let bin = a.raw().find_bin(100.0).unwrap();
        assert_eq!(a.raw().content(bin), 2.0);
    }

    #[test]
    fn test_merge_carries_missing_marks() {
        let mut a = make_set(false);
        let mut b = make_set(false);
        b.accrue_luminosity(7, 7, None, 1);

        a.merge(b).unwrap();
        assert_eq!(a.missing_section_count(), 1);
    }

    #[test]
    fn test_merge_rejects_mismatched_sets() {
        let mut a = make_set(false);
        let trigger = TriggerPhaseSpace::new("jt30", 30.0, 0.0, 84.0);
        let b = HistogramSet::new(&trigger, Region::new(0.0, 0.5), false).unwrap();
        assert!(a.merge(b).is_err());
    }
}
