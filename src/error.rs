//! Error handling for Ronflex
//!
//! Sweep-local failures live in [`AnalysisError`]; everything that crosses a
//! collaborator boundary (recordings, configuration, output) is a
//! [`RonflexError`].

use std::path::PathBuf;

use thiserror::Error;

pub use crate::analysis::error::AnalysisError;

/// Result type alias for Ronflex operations
pub type Result<T> = std::result::Result<T, RonflexError>;

/// Main error type for Ronflex operations
#[derive(Error, Debug)]
pub enum RonflexError {
    // Sweep analysis
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    // Source provider errors
    #[error("Invalid sweep count: {reported}")]
    InvalidSweepCount { reported: String },

    #[error("Provider failure in {source_name}: {reason}")]
    ProviderFailure { source_name: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported recording: {path} (expected *.wav or *.sweeps.json)")]
    UnsupportedRecording { path: PathBuf },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    // Batch errors
    #[error("Batch aborted: {failed} of {total} studies failed")]
    BatchAborted { failed: usize, total: usize },

    // Plot errors
    #[error("Plot error: {reason}")]
    Plot { reason: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RonflexError {
    /// Shorthand for a provider failure
    pub fn provider(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        RonflexError::ProviderFailure {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RonflexError::Analysis(e) => e.code(),
            RonflexError::InvalidSweepCount { .. } => "INVALID_SWEEP_COUNT",
            RonflexError::ProviderFailure { .. } => "PROVIDER_FAILURE",
            RonflexError::FileNotFound { .. } => "FILE_NOT_FOUND",
            RonflexError::UnsupportedRecording { .. } => "UNSUPPORTED_RECORDING",
            RonflexError::InvalidConfig { .. } => "INVALID_CONFIG",
            RonflexError::BatchAborted { .. } => "BATCH_ABORTED",
            RonflexError::Plot { .. } => "PLOT_ERROR",
            RonflexError::Wav(_) => "WAV_ERROR",
            RonflexError::Io(_) => "IO_ERROR",
            RonflexError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the failure belongs to a single sweep rather than the whole
    /// recording or batch
    pub fn is_sweep_local(&self) -> bool {
        matches!(self, RonflexError::Analysis(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RonflexError::InvalidSweepCount {
            reported: "0".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_SWEEP_COUNT");

        let err = RonflexError::provider("study.wav", "missing channel 3");
        assert_eq!(err.error_code(), "PROVIDER_FAILURE");
        assert!(err.to_string().contains("missing channel 3"));

        let err = RonflexError::Plot {
            reason: "drawing area too small".to_string(),
        };
        assert_eq!(err.error_code(), "PLOT_ERROR");
        assert!(!err.is_sweep_local());
    }

    #[test]
    fn test_sweep_local_errors() {
        let err: RonflexError = AnalysisError::EmptySpikeSet.into();
        assert!(err.is_sweep_local());
        assert_eq!(err.error_code(), "EMPTY_SPIKE_SET");

        let err = RonflexError::FileNotFound {
            path: PathBuf::from("missing.wav"),
        };
        assert!(!err.is_sweep_local());
    }
}
