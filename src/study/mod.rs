//! Studies
//!
//! A `Study` is one opened recording: its metadata and the sweeps read from
//! the configured channel. Analysing it yields a `StudyReport`, which every
//! exporter renders from; sweep plots are drawn from the study itself.

pub mod batch;
pub mod export;
pub mod plot;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::analysis::{AnalysisError, Sweep, SweepRecord};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::source::{open_recording, ChannelInfo, RecordingSource};

pub use batch::{analyse_and_save, collect_recordings, BatchOptions, BatchReport};
pub use export::{render, ExportFormat};

/// What to do when a sweep cannot be analysed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the sweep out of the records, list it as a failure and go on
    #[default]
    Skip,
    /// Fail the study, and with it the batch, before anything is written
    Abort,
}

/// A sweep that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub sweep_id: usize,
    pub code: String,
    pub message: String,
}

impl SweepFailure {
    fn new(sweep_id: usize, error: &AnalysisError) -> Self {
        Self {
            sweep_id,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Analysis results of a study, ready for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub name: String,
    pub protocol: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub channel: ChannelInfo,
    pub sweep_count: usize,
    /// SHA-256 of the source file, when read from disk
    pub checksum: Option<String>,
    pub records: Vec<SweepRecord>,
    pub failures: Vec<SweepFailure>,
}

/// One recording and its sweeps
#[derive(Debug)]
pub struct Study {
    name: String,
    source_path: Option<PathBuf>,
    protocol: Option<String>,
    start_time: Option<DateTime<Utc>>,
    channel: ChannelInfo,
    checksum: Option<String>,
    sweeps: Vec<Sweep>,
}

impl Study {
    /// Open a recording file and read all its sweeps
    pub fn open(path: &Path, config: &AnalysisConfig) -> Result<Self> {
        let source = open_recording(path, config)?;
        let mut study = Self::from_source(source.as_ref(), config)?;
        study.source_path = Some(path.to_path_buf());
        study.checksum = Some(file_checksum(path)?);
        Ok(study)
    }

    /// Read all sweeps of an already opened source
    ///
    /// # Errors
    /// * `InvalidSweepCount` - the source reports an unusable sweep count
    /// * `ProviderFailure` - the configured channel or a sweep is unreadable
    pub fn from_source(source: &dyn RecordingSource, config: &AnalysisConfig) -> Result<Self> {
        let metadata = source.metadata();
        let sweep_count = source.sweep_count()?;
        let channel = source.channel(config.default_channel)?.clone();

        if metadata.start_time.is_none() {
            warn!(study = %metadata.name, "Start time is not available");
        }

        info!(
            study = %metadata.name,
            sweeps = sweep_count,
            channel = %channel.name,
            "Creating sweep data"
        );
        let sweeps = (0..sweep_count)
            .map(|index| {
                let samples = source.sweep(index, config.default_channel)?;
                Sweep::from_samples(index, &samples.times, &samples.amps, config)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: metadata.name.clone(),
            source_path: None,
            protocol: metadata.protocol.clone(),
            start_time: metadata.start_time,
            channel,
            checksum: None,
            sweeps,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn channel(&self) -> &ChannelInfo {
        &self.channel
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn sweeps(&self) -> &[Sweep] {
        &self.sweeps
    }

    pub fn sweep_count(&self) -> usize {
        self.sweeps.len()
    }

    /// Analyse every sweep in parallel
    ///
    /// Under [`FailurePolicy::Skip`] failed sweeps are listed in the report;
    /// under [`FailurePolicy::Abort`] the first failed sweep (by id) is
    /// returned as the error.
    pub fn analyse(&self, policy: FailurePolicy) -> Result<StudyReport> {
        let outcomes: Vec<_> = self
            .sweeps
            .par_iter()
            .map(|sweep| (sweep.id(), sweep.record()))
            .collect();

        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (sweep_id, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => match policy {
                    FailurePolicy::Skip => {
                        warn!(study = %self.name, sweep = sweep_id, error = %e, "Skipping sweep");
                        failures.push(SweepFailure::new(sweep_id, &e));
                    }
                    FailurePolicy::Abort => {
                        error!(study = %self.name, sweep = sweep_id, error = %e, "Sweep failed");
                        return Err(e.into());
                    }
                },
            }
        }

        info!(
            study = %self.name,
            analysed = records.len(),
            failed = failures.len(),
            "Finished sweeps"
        );
        Ok(StudyReport {
            name: self.name.clone(),
            protocol: self.protocol.clone(),
            start_time: self.start_time,
            channel: self.channel.clone(),
            sweep_count: self.sweeps.len(),
            checksum: self.checksum.clone(),
            records,
            failures,
        })
    }
}

/// SHA-256 of a file, hex encoded
fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RonflexError;
    use crate::source::JsonRecording;
    use pretty_assertions::assert_eq;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            segment_start: -1.0,
            segment_end: 100.0,
            default_channel: 0,
            default_curve_check: 20.0,
            ..AnalysisConfig::default()
        }
    }

    /// Sweep 0 has a stimulus and two responses, sweep 1 is flat
    fn recording() -> JsonRecording {
        let mut evoked = vec![0.0; 61];
        evoked[0] = 5.0;
        evoked[20] = 0.3;
        evoked[35] = 0.25;
        let flat = vec![0.0; 61];
        let text = serde_json::json!({
            "protocol": "Dorsal stim",
            "sample_rate": 1000.0,
            "channels": [{ "name": "IN 0", "units": "V" }],
            "sweeps": [{ "channels": [evoked] }, { "channels": [flat] }]
        })
        .to_string();
        JsonRecording::from_json("24415011", &text).unwrap()
    }

    #[test]
    fn test_from_source() {
        let study = Study::from_source(&recording(), &config()).unwrap();

        assert_eq!(study.name(), "24415011");
        assert_eq!(study.protocol(), Some("Dorsal stim"));
        assert_eq!(study.sweep_count(), 2);
        assert_eq!(study.channel().name, "IN 0");
        assert!(study.checksum().is_none());
    }

    #[test]
    fn test_missing_channel_fails_study() {
        let config = AnalysisConfig {
            default_channel: 1,
            ..config()
        };
        let result = Study::from_source(&recording(), &config);
        assert!(matches!(result, Err(RonflexError::ProviderFailure { .. })));
    }

    #[test]
    fn test_skip_policy_lists_failures() {
        let study = Study::from_source(&recording(), &config()).unwrap();

        let report = study.analyse(FailurePolicy::Skip).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].sweep_id, 0);
        assert_eq!(
            report.failures,
            vec![SweepFailure {
                sweep_id: 1,
                code: "EMPTY_SPIKE_SET".to_string(),
                message: "No spikes detected above threshold".to_string(),
            }]
        );
    }

    #[test]
    fn test_abort_policy_fails_study() {
        let study = Study::from_source(&recording(), &config()).unwrap();

        let result = study.analyse(FailurePolicy::Abort);

        assert!(matches!(
            result,
            Err(RonflexError::Analysis(AnalysisError::EmptySpikeSet))
        ));
    }

    #[test]
    fn test_checksum_of_opened_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("24415011.sweeps.json");
        let text = serde_json::json!({
            "sample_rate": 1000.0,
            "channels": [{ "name": "IN 0", "units": "V" }],
            "sweeps": [{ "channels": [[0.0, 1.0, 0.0]] }]
        })
        .to_string();
        std::fs::write(&path, &text).unwrap();

        let study = Study::open(&path, &config()).unwrap();

        let expected = format!("{:x}", Sha256::digest(text.as_bytes()));
        assert_eq!(study.checksum(), Some(expected.as_str()));
        assert_eq!(study.source_path(), Some(path.as_path()));
    }
}
