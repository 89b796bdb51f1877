//! Configuration structures for the jet spectra pipeline.
//!
//! One immutable value constructed up front and passed into the aggregation
//! stage; nothing here is global or mutated during a pass.

use crate::types::{DatasetKind, Region, TriggerPhaseSpace};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Dataset kind (data or simulation).
    pub dataset: DatasetKind,
    /// Triggers with thresholds and efficient pT ranges.
    pub triggers: Vec<TriggerPhaseSpace>,
    /// Absolute-rapidity regions to histogram.
    pub regions: Vec<Region>,
    /// Spectrum-building configuration.
    pub spectra: SpectraConfig,
    /// Luminosity bookkeeping configuration.
    pub luminosity: LuminosityConfig,
    /// Event feed configuration.
    pub input: InputConfig,
    /// Output store configuration.
    pub output: OutputConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetKind::Data,
            triggers: default_triggers(),
            regions: default_regions(),
            spectra: SpectraConfig::default(),
            luminosity: LuminosityConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// The 2011 single-jet triggers with their efficient pT windows.
fn default_triggers() -> Vec<TriggerPhaseSpace> {
    vec![
        TriggerPhaseSpace::new("jt30", 30.0, 0.0, 84.0),
        TriggerPhaseSpace::new("jt60", 60.0, 84.0, 196.0),
        TriggerPhaseSpace::new("jt110", 110.0, 196.0, 300.0),
        TriggerPhaseSpace::new("jt190", 190.0, 300.0, 362.0),
        TriggerPhaseSpace::new("jt240", 240.0, 362.0, 507.0),
        TriggerPhaseSpace::new("jt370", 370.0, 507.0, 6500.0),
    ]
}

/// Half-unit rapidity tiling out to 3.0, the transition and forward slices,
/// plus the wide 0.0-1.3 barrel region.
fn default_regions() -> Vec<Region> {
    vec![
        Region::new(0.0, 0.5),
        Region::new(0.5, 1.0),
        Region::new(1.0, 1.5),
        Region::new(1.5, 2.0),
        Region::new(2.0, 2.5),
        Region::new(2.5, 3.0),
        Region::new(3.0, 3.2),
        Region::new(3.2, 4.7),
        Region::new(0.0, 1.3),
    ]
}

/// Spectrum-building configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectraConfig {
    /// Whether the spectrum aggregation stage runs at all.
    pub enabled: bool,
    /// Global reconstruction pT cut in GeV; jets at or below it never enter
    /// the raw or prescaled spectra.
    pub reco_pt_min: f64,
    /// Top-level stage name in the output hierarchy.
    pub stage: String,
}

impl Default for SpectraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reco_pt_min: 15.0,
            stage: "Standard".to_string(),
        }
    }
}

/// Luminosity bookkeeping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuminosityConfig {
    /// Whether to load the luminosity feed and accrue per-section sums.
    /// Only meaningful for data; simulation never accrues.
    pub enabled: bool,
    /// Path to the by-section luminosity CSV.
    pub file: Option<PathBuf>,
}

impl Default for LuminosityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

/// Event feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the JSON-lines event feed.
    pub events_file: Option<PathBuf>,
    /// Optional cap on the number of events processed.
    pub max_events: Option<u64>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            events_file: None,
            max_events: None,
        }
    }
}

/// Output store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the output document.
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output-DATA-1.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.dataset, DatasetKind::Data);
        assert_eq!(config.triggers.len(), 6);
        assert_eq!(config.regions.len(), 9);
        assert_eq!(config.spectra.reco_pt_min, 15.0);
        assert_eq!(config.spectra.stage, "Standard");
        assert!(config.spectra.enabled);
        assert!(config.input.max_events.is_none());
    }

    #[test]
    fn test_default_triggers_ordered_by_threshold() {
        let config = AnalysisConfig::default();
        for pair in config.triggers.windows(2) {
            assert!(pair[0].threshold < pair[1].threshold);
        }
    }

    #[test]
    fn test_trigger_ranges_chain() {
        // Each trigger's efficient window starts where the previous ends
        let config = AnalysisConfig::default();
        for pair in config.triggers.windows(2) {
            assert_eq!(pair[0].pt_max, pair[1].pt_min);
        }
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.triggers, config.triggers);
        assert_eq!(back.regions.len(), config.regions.len());
    }
}
