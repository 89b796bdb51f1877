//! Core types and configuration for the jet spectra pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Event and kinematics types (jets, regions, triggers)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use types::*;
