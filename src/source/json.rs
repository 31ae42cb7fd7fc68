//! JSON sweep recordings
//!
//! ```json
//! {
//!   "protocol": "Dorsal stim 0.5 Hz",
//!   "start_time": "2024-04-15T10:12:00Z",
//!   "sample_rate": 10000.0,
//!   "channels": [{ "name": "IN 0", "units": "mV" }, { "name": "IN 2", "units": "V" }],
//!   "sweep_count": 2,
//!   "sweeps": [{ "channels": [[0.0, 0.1], [0.0, -0.2]] }, { "channels": [[0.0, 0.0], [0.1, 0.3]] }]
//! }
//! ```
//!
//! Sample `i` of every sweep sits at `i / sample_rate` seconds.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::{
    recording_name, validate_sweep_count, ChannelInfo, RecordingMetadata, RecordingSource,
    SweepSamples,
};
use crate::error::{Result, RonflexError};

/// File name suffix of JSON recordings
pub const JSON_RECORDING_SUFFIX: &str = ".sweeps.json";

#[derive(Debug, Deserialize)]
struct JsonFile {
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    sample_rate: f64,
    channels: Vec<ChannelInfo>,
    /// Kept untyped so a non-numeric count is reported as such
    #[serde(default)]
    sweep_count: Option<serde_json::Value>,
    sweeps: Vec<JsonSweep>,
}

#[derive(Debug, Deserialize)]
struct JsonSweep {
    channels: Vec<Vec<f64>>,
}

/// Recording stored as a `*.sweeps.json` file
#[derive(Debug)]
pub struct JsonRecording {
    metadata: RecordingMetadata,
    sample_rate: f64,
    reported_count: Option<serde_json::Value>,
    sweeps: Vec<JsonSweep>,
}

impl JsonRecording {
    /// Read and parse a JSON recording
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&recording_name(path), &text)
    }

    /// Parse a JSON recording held in memory
    pub fn from_json(name: &str, text: &str) -> Result<Self> {
        let file: JsonFile = serde_json::from_str(text)
            .map_err(|e| RonflexError::provider(name, format!("malformed recording: {}", e)))?;

        if !(file.sample_rate.is_finite() && file.sample_rate > 0.0) {
            return Err(RonflexError::provider(
                name,
                format!("invalid sample rate {}", file.sample_rate),
            ));
        }

        let start_time = match file.start_time.as_deref().map(DateTime::parse_from_rfc3339) {
            Some(Ok(time)) => Some(time.with_timezone(&Utc)),
            Some(Err(e)) => {
                warn!(recording = name, error = %e, "Start time is not an RFC 3339 timestamp");
                None
            }
            None => None,
        };

        Ok(Self {
            metadata: RecordingMetadata {
                name: name.to_string(),
                protocol: file.protocol,
                start_time,
                channels: file.channels,
            },
            sample_rate: file.sample_rate,
            reported_count: file.sweep_count,
            sweeps: file.sweeps,
        })
    }
}

impl RecordingSource for JsonRecording {
    fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }

    fn sweep_count(&self) -> Result<usize> {
        let Some(reported) = &self.reported_count else {
            return validate_sweep_count(self.sweeps.len() as f64);
        };
        let count = reported
            .as_f64()
            .ok_or_else(|| RonflexError::InvalidSweepCount {
                reported: reported.to_string(),
            })
            .and_then(validate_sweep_count)?;

        if count > self.sweeps.len() {
            return Err(RonflexError::provider(
                &self.metadata.name,
                format!(
                    "sweep_count is {} but only {} sweeps are stored",
                    count,
                    self.sweeps.len()
                ),
            ));
        }
        Ok(count)
    }

    fn sweep(&self, index: usize, channel: usize) -> Result<SweepSamples> {
        self.channel(channel)?;
        let sweep = self.sweeps.get(index).ok_or_else(|| {
            RonflexError::provider(&self.metadata.name, format!("no sweep {}", index))
        })?;
        let amps = sweep.channels.get(channel).ok_or_else(|| {
            RonflexError::provider(
                &self.metadata.name,
                format!("sweep {} has no data for channel {}", index, channel),
            )
        })?;

        let times = (0..amps.len())
            .map(|i| i as f64 / self.sample_rate)
            .collect();
        Ok(SweepSamples {
            times,
            amps: amps.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECORDING: &str = r#"{
        "protocol": "Dorsal stim",
        "start_time": "2024-04-15T10:12:00Z",
        "sample_rate": 1000.0,
        "channels": [{ "name": "IN 0", "units": "mV" }, { "name": "IN 2", "units": "V" }],
        "sweeps": [
            { "channels": [[0.0, 0.1, 0.2], [1.0, -1.0, 0.5]] },
            { "channels": [[0.0, 0.0, 0.0], [0.3, 0.2, 0.1]] }
        ]
    }"#;

    #[test]
    fn test_metadata() {
        let recording = JsonRecording::from_json("24415011", RECORDING).unwrap();
        let metadata = recording.metadata();

        assert_eq!(metadata.name, "24415011");
        assert_eq!(metadata.protocol.as_deref(), Some("Dorsal stim"));
        assert_eq!(
            metadata.start_time.map(|t| t.to_rfc3339()),
            Some("2024-04-15T10:12:00+00:00".to_string())
        );
        assert_eq!(recording.channel(1).unwrap().units, "V");
        assert_eq!(recording.sweep_count().unwrap(), 2);
    }

    #[test]
    fn test_sweep_samples() {
        let recording = JsonRecording::from_json("r", RECORDING).unwrap();

        let samples = recording.sweep(0, 1).unwrap();

        assert_eq!(samples.times, vec![0.0, 0.001, 0.002]);
        assert_eq!(samples.amps, vec![1.0, -1.0, 0.5]);
    }

    #[test]
    fn test_missing_channel() {
        let recording = JsonRecording::from_json("r", RECORDING).unwrap();
        assert!(matches!(
            recording.sweep(0, 4),
            Err(RonflexError::ProviderFailure { .. })
        ));
        assert!(matches!(
            recording.sweep(5, 0),
            Err(RonflexError::ProviderFailure { .. })
        ));
    }

    #[test]
    fn test_reported_count_validated() {
        let zero = RECORDING.replacen("\"sweeps\"", "\"sweep_count\": 0, \"sweeps\"", 1);
        let recording = JsonRecording::from_json("r", &zero).unwrap();
        assert!(matches!(
            recording.sweep_count(),
            Err(RonflexError::InvalidSweepCount { .. })
        ));

        let text = RECORDING.replacen("\"sweeps\"", "\"sweep_count\": \"two\", \"sweeps\"", 1);
        let recording = JsonRecording::from_json("r", &text).unwrap();
        assert!(matches!(
            recording.sweep_count(),
            Err(RonflexError::InvalidSweepCount { .. })
        ));

        let too_many = RECORDING.replacen("\"sweeps\"", "\"sweep_count\": 3, \"sweeps\"", 1);
        let recording = JsonRecording::from_json("r", &too_many).unwrap();
        assert!(matches!(
            recording.sweep_count(),
            Err(RonflexError::ProviderFailure { .. })
        ));
    }

    #[test]
    fn test_empty_recording_has_invalid_count() {
        let text = r#"{ "sample_rate": 1000.0, "channels": [], "sweeps": [] }"#;
        let recording = JsonRecording::from_json("r", text).unwrap();
        assert!(recording.metadata().start_time.is_none());
        assert!(matches!(
            recording.sweep_count(),
            Err(RonflexError::InvalidSweepCount { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_provider_failure() {
        let result = JsonRecording::from_json("r", "{ not json");
        assert!(matches!(result, Err(RonflexError::ProviderFailure { .. })));
    }
}
