//! Spectrum construction for the jet spectra pipeline.
//!
//! This crate handles:
//! - Per-region pT bin edge selection
//! - Weighted accumulation with variance tracking
//! - Per-(region, trigger) histogram sets with luminosity dedup
//! - The single-pass event aggregation engine

pub mod accumulator;
pub mod aggregator;
pub mod binning;
pub mod histogram_set;

pub use accumulator::BinnedAccumulator;
pub use aggregator::{AggregationStats, EventAggregator};
pub use histogram_set::{HistogramSet, LumiAccrual, SpectrumRecord};
