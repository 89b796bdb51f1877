//! Feed ingestion for the jet spectra pipeline.
//!
//! This crate handles:
//! - Event feed readers (JSON-lines and in-memory sources)
//! - Recorded-luminosity ledger and its CSV loader

pub mod event_source;
pub mod lumi;

pub use event_source::{EventSource, JsonLinesSource, VecSource};
pub use lumi::{LuminosityLedger, LUMI_CSV_HEADER};
