//! Error types for per-sweep analysis.

use thiserror::Error;

/// Errors local to one sweep's derivation.
///
/// Kept `Clone` so a failed derivation can be memoized alongside successful
/// ones.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// No spike above threshold, so neither a stimulus nor a response window
    /// can be derived.
    #[error("No spikes detected above threshold")]
    EmptySpikeSet,

    /// A boundary time is not an exact sample of the signal.
    #[error("Time {time} ms not found in signal")]
    SampleNotFound { time: f64 },
}

impl AnalysisError {
    /// Stable identifier used in exports.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EmptySpikeSet => "EMPTY_SPIKE_SET",
            AnalysisError::SampleNotFound { .. } => "SAMPLE_NOT_FOUND",
        }
    }
}
