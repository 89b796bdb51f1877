//! Error types for the jet spectra pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the jet spectra pipeline.
///
/// Every variant is fatal: the aggregation pass aborts rather than emitting
/// partially-correct spectra. This is a one-shot batch reduction, not a
/// service, so there is no retry path.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (bad feed header, unknown binning scheme,
    /// unwritable output location).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inconsistent input data (e.g. a fired trigger carrying prescale zero).
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The pass was cancelled cooperatively between events.
    #[error("Aggregation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data integrity error.
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Error::DataIntegrity(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("unknown binning scheme");
        assert_eq!(err.to_string(), "Configuration error: unknown binning scheme");

        let err = Error::data_integrity("prescale zero for trigger jt30 in run 1");
        assert!(err.to_string().starts_with("Data integrity error:"));
    }
}
