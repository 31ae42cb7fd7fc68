//! Recording Sources
//!
//! Providers decode a recording into per-sweep `(times, amplitudes)` arrays.
//! Times are in seconds relative to the sweep start and amplitudes are in the
//! channel's native units.
//!
//! Two formats are supported:
//! - `*.sweeps.json` - sweeps stored as JSON arrays
//! - `*.wav` - multichannel WAV cut into fixed-length sweeps

mod json;
mod wav;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AnalysisConfig;
use crate::error::{Result, RonflexError};

pub use json::{JsonRecording, JSON_RECORDING_SUFFIX};
pub use wav::WavRecording;

/// Name and units of a recorded channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    pub units: String,
}

/// Recording-level information reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Recording identifier, the file stem
    pub name: String,
    pub protocol: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub channels: Vec<ChannelInfo>,
}

/// Samples of one sweep on one channel
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSamples {
    /// Sample times in seconds
    pub times: Vec<f64>,
    pub amps: Vec<f64>,
}

/// Provider of sweeps for a single recording
pub trait RecordingSource: Send {
    fn metadata(&self) -> &RecordingMetadata;

    /// Number of sweeps available
    ///
    /// # Errors
    /// * `InvalidSweepCount` - if the recording reports a non-positive or
    ///   non-numeric count
    fn sweep_count(&self) -> Result<usize>;

    /// Samples of sweep `index` on `channel`
    ///
    /// # Errors
    /// * `ProviderFailure` - out-of-range sweep, missing channel, bad data
    fn sweep(&self, index: usize, channel: usize) -> Result<SweepSamples>;

    /// Channel description, if the channel exists
    fn channel(&self, channel: usize) -> Result<&ChannelInfo> {
        let metadata = self.metadata();
        metadata.channels.get(channel).ok_or_else(|| {
            RonflexError::provider(
                &metadata.name,
                format!(
                    "channel {} requested but recording has {} channels",
                    channel,
                    metadata.channels.len()
                ),
            )
        })
    }
}

/// Check a reported sweep count is a positive whole number
pub fn validate_sweep_count(reported: f64) -> Result<usize> {
    if reported.is_finite() && reported > 0.0 && reported.fract() == 0.0 {
        Ok(reported as usize)
    } else {
        Err(RonflexError::InvalidSweepCount {
            reported: reported.to_string(),
        })
    }
}

/// Whether `path` names a recording a provider can open
pub fn is_recording(path: &Path) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    let Some(file_name) = file_name.to_str() else {
        warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
        return false;
    };
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(JSON_RECORDING_SUFFIX) || lower.ends_with(".wav")
}

/// Open a recording with the provider matching its file name
pub fn open_recording(path: &Path, config: &AnalysisConfig) -> Result<Box<dyn RecordingSource>> {
    if !path.exists() {
        return Err(RonflexError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let lower = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if lower.ends_with(JSON_RECORDING_SUFFIX) {
        Ok(Box::new(JsonRecording::open(path)?))
    } else if lower.ends_with(".wav") {
        Ok(Box::new(WavRecording::open(path, config.wav_sweep_length)?))
    } else {
        Err(RonflexError::UnsupportedRecording {
            path: path.to_path_buf(),
        })
    }
}

/// Recording name derived from its path
pub(crate) fn recording_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording");
    let lower = file_name.to_ascii_lowercase();
    let stem_len = if lower.ends_with(JSON_RECORDING_SUFFIX) {
        file_name.len() - JSON_RECORDING_SUFFIX.len()
    } else {
        file_name.rfind('.').unwrap_or(file_name.len())
    };
    file_name[..stem_len].to_string()
}
