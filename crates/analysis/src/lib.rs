//! Analysis driver for the jet spectra pipeline.
//!
//! This crate provides:
//! - The hierarchical spectrum output store (atomic JSON commits)
//! - The runner sequencing ledger load, aggregation, finalize, and persist

pub mod runner;
pub mod store;

pub use runner::{AnalysisRunner, AnalysisSummary};
pub use store::{OutputDocument, SpectrumStore};
