//! Persistence of finalized spectra.
//!
//! Spectra are stored as one JSON document organized
//! `stage -> region label -> trigger -> spectrum record`, the hierarchy the
//! downstream normalization, stitching, and unfolding stages navigate.
//! Commits are atomic: the document is written next to its destination and
//! renamed into place, so an aborted pass leaves no partial output.

use jetspec_core::{Error, Result};
use jetspec_spectra::SpectrumRecord;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Nested output document: stage -> region label -> trigger -> record.
pub type OutputDocument = BTreeMap<String, BTreeMap<String, BTreeMap<String, SpectrumRecord>>>;

/// Output store bound to one document path.
#[derive(Debug)]
pub struct SpectrumStore {
    path: PathBuf,
}

impl SpectrumStore {
    /// Bind a store to `path`, validating the location up front so a bad
    /// output destination fails before any event is read.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.is_dir() {
            return Err(Error::config(format!(
                "output location {} is a directory",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(Error::config(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }

        Ok(Self { path })
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the records under one stage, atomically.
    pub fn commit(&self, stage: &str, records: Vec<SpectrumRecord>) -> Result<()> {
        let mut document = OutputDocument::new();
        let stage_map = document.entry(stage.to_string()).or_default();
        for record in records {
            stage_map
                .entry(record.region.label())
                .or_default()
                .insert(record.trigger.clone(), record);
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &document)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        info!(path = %self.path.display(), "output stored");
        Ok(())
    }

    /// Read a previously committed document.
    pub fn load(path: impl AsRef<Path>) -> Result<OutputDocument> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetspec_core::{Region, TriggerPhaseSpace};
    use jetspec_spectra::HistogramSet;

    fn make_record(trigger: &str, region: Region) -> SpectrumRecord {
        let phase_space = TriggerPhaseSpace::new(trigger, 30.0, 0.0, 84.0);
        let mut set = HistogramSet::new(&phase_space, region, false).unwrap();
        set.fill_raw(100.0, 1.0);
        set.accrue_luminosity(1, 1, Some(2.0), 2);
        set.finalize()
    }

    #[test]
    fn test_commit_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output-DATA-1.json");
        let store = SpectrumStore::create(&path).unwrap();

        store
            .commit(
                "Standard",
                vec![
                    make_record("jt30", Region::new(0.0, 0.5)),
                    make_record("jt60", Region::new(0.0, 0.5)),
                    make_record("jt30", Region::new(0.5, 1.0)),
                ],
            )
            .unwrap();

        let document = SpectrumStore::load(&path).unwrap();
        let stage = &document["Standard"];
        assert_eq!(stage.len(), 2);
        assert_eq!(stage["Eta_0.0-0.5"].len(), 2);

        let record = &stage["Eta_0.0-0.5"]["jt30"];
        assert_eq!(record.trigger, "jt30");
        assert!((record.lumi_sum - 1.0).abs() < 1e-12);
        assert_eq!(record.raw.integral(), 1.0);
    }

    #[test]
    fn test_create_rejects_missing_directory() {
        let err = SpectrumStore::create("/nonexistent/dir/out.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_create_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = SpectrumStore::create(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_commit_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let store = SpectrumStore::create(&path).unwrap();
        store.commit("Standard", Vec::new()).unwrap();

        assert!(path.is_file());
        assert!(!dir.path().join("out.json.tmp").exists());
    }
}
