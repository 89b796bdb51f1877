//! Core data types for the jet spectra pipeline.

use serde::{Deserialize, Serialize};

/// Run number identifying one data-taking period.
pub type RunId = u32;

/// Luminosity section number within a run.
pub type SectionId = u32;

/// Key identifying one luminosity section globally.
pub type LumiKey = (RunId, SectionId);

/// Kind of dataset being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Recorded collision data.
    Data,
    /// Simulated (generator-level truth available, event weights apply).
    Simulation,
}

impl DatasetKind {
    /// Is this recorded data?
    #[inline]
    pub fn is_data(self) -> bool {
        matches!(self, DatasetKind::Data)
    }

    /// Is this simulation?
    #[inline]
    pub fn is_simulation(self) -> bool {
        matches!(self, DatasetKind::Simulation)
    }
}

/// Half-open absolute-rapidity interval `[ymin, ymax)`.
///
/// The configured regions tile the measurable range and must not overlap,
/// except for auxiliary wide regions (e.g. the 0.0-1.3 barrel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Lower absolute-rapidity bound (inclusive).
    pub ymin: f64,
    /// Upper absolute-rapidity bound (exclusive).
    pub ymax: f64,
}

impl Region {
    /// Create a new region.
    pub fn new(ymin: f64, ymax: f64) -> Self {
        Self { ymin, ymax }
    }

    /// Test whether an absolute rapidity falls inside this region.
    #[inline]
    pub fn contains_abs(&self, y_abs: f64) -> bool {
        self.ymin <= y_abs && y_abs < self.ymax
    }

    /// Index of the binning scheme this region maps to.
    ///
    /// Computed from the region midpoint in half-unit steps, so both a
    /// regular half-unit region and a wide region centered in the same
    /// half-unit slot share one scheme.
    #[inline]
    pub fn scheme_index(&self) -> usize {
        (0.5 * (self.ymin + self.ymax) / 0.5) as usize
    }

    /// Label used for the output hierarchy, e.g. `Eta_0.0-0.5`.
    pub fn label(&self) -> String {
        format!("Eta_{:.1}-{:.1}", self.ymin, self.ymax)
    }
}

/// One trigger with its nominal threshold and efficient pT range.
///
/// The trigger is considered unbiased over `[pt_min, pt_max)`; downstream
/// stitching uses that window when combining spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerPhaseSpace {
    /// Trigger identifier, e.g. `jt60`.
    pub name: String,
    /// Nominal online threshold in GeV.
    pub threshold: f64,
    /// Lower edge of the efficient pT range (inclusive).
    pub pt_min: f64,
    /// Upper edge of the efficient pT range (exclusive).
    pub pt_max: f64,
}

impl TriggerPhaseSpace {
    /// Create a new trigger phase space.
    pub fn new(name: impl Into<String>, threshold: f64, pt_min: f64, pt_max: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
            pt_min,
            pt_max,
        }
    }
}

/// Four-momentum of one jet in detector coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetKinematics {
    /// Transverse momentum in GeV.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuthal angle.
    pub phi: f64,
    /// Energy in GeV.
    pub energy: f64,
}

impl JetKinematics {
    /// Create a jet from (pt, eta, phi, E).
    pub fn new(pt: f64, eta: f64, phi: f64, energy: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            energy,
        }
    }

    /// Longitudinal momentum component.
    #[inline]
    pub fn pz(&self) -> f64 {
        self.pt * self.eta.sinh()
    }

    /// Rapidity `y = 0.5 * ln((E + pz) / (E - pz))`.
    ///
    /// Unphysical four-momenta (|pz| >= E) yield a non-finite value, which
    /// fails every region window test and drops the jet.
    #[inline]
    pub fn rapidity(&self) -> f64 {
        let pz = self.pz();
        0.5 * ((self.energy + pz) / (self.energy - pz)).ln()
    }
}

/// One collision event as delivered by the event feed.
///
/// `fired` and `prescales` are aligned to `trigger_names`; the name list is
/// assumed stable after the first record, so consumers read it once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Run number.
    pub run: RunId,
    /// Luminosity section number.
    pub section: SectionId,
    /// Event number within the run.
    #[serde(default)]
    pub event: u64,
    /// Trigger names, aligned with `fired` and `prescales`.
    pub trigger_names: Vec<String>,
    /// Per-trigger fired flags.
    pub fired: Vec<bool>,
    /// Per-trigger prescale factors.
    pub prescales: Vec<u32>,
    /// Reconstructed jets.
    pub jets: Vec<JetKinematics>,
    /// Generator-level jets (simulation only).
    #[serde(default)]
    pub gen_jets: Vec<JetKinematics>,
    /// Event weight (simulation only; 1 for data).
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_region_contains() {
        let region = Region::new(0.5, 1.0);
        assert!(region.contains_abs(0.5));
        assert!(region.contains_abs(0.99));
        assert!(!region.contains_abs(1.0));
        assert!(!region.contains_abs(0.49));
    }

    #[test]
    fn test_region_scheme_index() {
        assert_eq!(Region::new(0.0, 0.5).scheme_index(), 0);
        assert_eq!(Region::new(2.5, 3.0).scheme_index(), 5);
        assert_eq!(Region::new(3.2, 4.7).scheme_index(), 7);
        // Wide barrel region shares the 0.5-1.0 slot
        assert_eq!(Region::new(0.0, 1.3).scheme_index(), 1);
    }

    #[test]
    fn test_region_label() {
        assert_eq!(Region::new(0.0, 0.5).label(), "Eta_0.0-0.5");
        assert_eq!(Region::new(3.2, 4.7).label(), "Eta_3.2-4.7");
    }

    #[test]
    fn test_rapidity_massless_equals_eta() {
        // For a massless jet E = pt*cosh(eta), so y == eta
        let eta = 1.2f64;
        let pt = 50.0;
        let jet = JetKinematics::new(pt, eta, 0.3, pt * eta.cosh());
        assert_relative_eq!(jet.rapidity(), eta, epsilon = 1e-12);
    }

    #[test]
    fn test_rapidity_central_jet() {
        // eta = 0 means pz = 0, so y = 0 regardless of mass
        let jet = JetKinematics::new(100.0, 0.0, 0.0, 120.0);
        assert!(jet.rapidity().abs() < 1e-12);
    }

    #[test]
    fn test_rapidity_below_eta_for_massive_jet() {
        // A massive jet has |y| < |eta|
        let jet = JetKinematics::new(40.0, 1.5, 0.0, 40.0 * 1.5f64.cosh() * 1.1);
        assert!(jet.rapidity().abs() < 1.5);
    }

    #[test]
    fn test_event_record_defaults() {
        let json = r#"{
            "run": 160431,
            "section": 25,
            "trigger_names": ["jt30"],
            "fired": [true],
            "prescales": [10],
            "jets": [{"pt": 45.0, "eta": 0.2, "phi": 1.0, "energy": 46.0}]
        }"#;
        let ev: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(ev.event, 0);
        assert!(ev.gen_jets.is_empty());
        assert_eq!(ev.weight, 1.0);
    }
}
