//! WAV recordings
//!
//! Every WAV channel is a recording channel. The file is cut into
//! consecutive sweeps of equal length; a trailing partial sweep is ignored.
//! Integer samples are scaled to ±1.0, float samples are read as-is.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use super::{
    recording_name, validate_sweep_count, ChannelInfo, RecordingMetadata, RecordingSource,
    SweepSamples,
};
use crate::error::{Result, RonflexError};

/// Recording stored as a multichannel WAV file
#[derive(Debug)]
pub struct WavRecording {
    metadata: RecordingMetadata,
    sample_rate: u32,
    /// De-interleaved samples, one vector per channel
    channels: Vec<Vec<f64>>,
    frames_per_sweep: usize,
}

impl WavRecording {
    /// Open a WAV file and cut it into sweeps of `sweep_length_ms`
    pub fn open(path: &Path, sweep_length_ms: f64) -> Result<Self> {
        let name = recording_name(path);
        let reader = WavReader::open(path)
            .map_err(|e| RonflexError::provider(&name, format!("failed to open WAV: {}", e)))?;

        let spec = reader.spec();
        let num_channels = spec.channels as usize;
        let interleaved = read_samples_as_f64(reader, spec.bits_per_sample, spec.sample_format)
            .map_err(|e| RonflexError::provider(&name, format!("failed to read samples: {}", e)))?;

        let frames_per_sweep =
            (f64::from(spec.sample_rate) * sweep_length_ms / 1000.0).round() as usize;
        if frames_per_sweep == 0 {
            return Err(RonflexError::provider(
                &name,
                format!(
                    "sweep length {} ms is shorter than one sample at {} Hz",
                    sweep_length_ms, spec.sample_rate
                ),
            ));
        }

        let channels = deinterleave(&interleaved, num_channels);
        debug!(
            recording = %name,
            channels = num_channels,
            sample_rate = spec.sample_rate,
            frames_per_sweep,
            "Opened WAV recording"
        );

        Ok(Self {
            metadata: RecordingMetadata {
                name,
                protocol: None,
                start_time: None,
                channels: (0..num_channels)
                    .map(|n| ChannelInfo {
                        name: format!("IN {}", n),
                        units: "V".to_string(),
                    })
                    .collect(),
            },
            sample_rate: spec.sample_rate,
            channels,
            frames_per_sweep,
        })
    }

    fn total_frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

impl RecordingSource for WavRecording {
    fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }

    fn sweep_count(&self) -> Result<usize> {
        validate_sweep_count((self.total_frames() / self.frames_per_sweep) as f64)
    }

    fn sweep(&self, index: usize, channel: usize) -> Result<SweepSamples> {
        self.channel(channel)?;
        let amps = index
            .checked_mul(self.frames_per_sweep)
            .and_then(|start| {
                let end = start.checked_add(self.frames_per_sweep)?;
                self.channels[channel].get(start..end)
            })
            .ok_or_else(|| {
                RonflexError::provider(&self.metadata.name, format!("no sweep {}", index))
            })?;

        let rate = f64::from(self.sample_rate);
        Ok(SweepSamples {
            times: (0..amps.len()).map(|i| i as f64 / rate).collect(),
            amps: amps.to_vec(),
        })
    }
}

fn read_samples_as_f64<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> std::result::Result<Vec<f64>, hound::Error> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect(),
        SampleFormat::Int => {
            let scale = f64::from(1u32 << (bits_per_sample.clamp(1, 32) - 1));
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect()
        }
    }
}

fn deinterleave(samples: &[f64], num_channels: usize) -> Vec<Vec<f64>> {
    (0..num_channels)
        .map(|ch| {
            samples
                .iter()
                .skip(ch)
                .step_by(num_channels)
                .copied()
                .collect()
        })
        .collect()
}
