//! Analysis configuration
//!
//! A flat JSON object of named parameters. Every key is optional and falls
//! back to the defaults below; unknown keys are rejected so a typo never
//! silently reverts a parameter to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, RonflexError};

/// Policy for an above-threshold run still open when the signal ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingRunPolicy {
    /// Drop the run; only runs closed by a below-threshold sample count
    #[default]
    Discard,
    /// Close the run at the last sample and report its peak
    Close,
}

/// Whether the sample at the end boundary contributes to an area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationBound {
    /// Integrate over `[start, end)`: the last trapezoid is omitted
    #[default]
    Exclusive,
    /// Integrate over `[start, end]`
    Inclusive,
}

/// Analysis parameters shared by every sweep of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Crop window start in ms (exclusive)
    pub segment_start: f64,
    /// Crop window end in ms (exclusive)
    pub segment_end: f64,
    /// Spike threshold on the raw signal
    pub default_tolerance: f64,
    /// Spike threshold on the rectified signal
    pub default_abs_tolerance: f64,
    /// Padding applied around the outermost response spikes, in ms
    pub default_ms_delay: f64,
    /// Width of the control window, in ms
    pub default_curve_check: f64,
    /// Channel read from each recording
    pub default_channel: usize,
    pub trailing_run: TrailingRunPolicy,
    pub integration_bound: IntegrationBound,
    /// Sweep length used to cut WAV recordings, in ms
    pub wav_sweep_length: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segment_start: 5568.0,
            segment_end: 5668.0,
            default_tolerance: 0.1,
            default_abs_tolerance: 0.15,
            default_ms_delay: 5.0,
            default_curve_check: 90.0,
            default_channel: 1,
            trailing_run: TrailingRunPolicy::Discard,
            integration_bound: IntegrationBound::Exclusive,
            wav_sweep_length: 10_000.0,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(RonflexError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), "Loaded analysis configuration");
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameters are usable
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("segment_start", self.segment_start),
            ("segment_end", self.segment_end),
            ("default_tolerance", self.default_tolerance),
            ("default_abs_tolerance", self.default_abs_tolerance),
            ("default_ms_delay", self.default_ms_delay),
            ("default_curve_check", self.default_curve_check),
            ("wav_sweep_length", self.wav_sweep_length),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(invalid(key, format!("{} is not a finite number", value)));
            }
        }

        if self.segment_start >= self.segment_end {
            return Err(invalid(
                "segment_start",
                format!(
                    "must be lower than segment_end ({} >= {})",
                    self.segment_start, self.segment_end
                ),
            ));
        }

        let non_negative = [
            ("default_tolerance", self.default_tolerance),
            ("default_abs_tolerance", self.default_abs_tolerance),
            ("default_ms_delay", self.default_ms_delay),
            ("default_curve_check", self.default_curve_check),
        ];
        for (key, value) in non_negative {
            if value < 0.0 {
                return Err(invalid(key, format!("must not be negative, got {}", value)));
            }
        }

        if self.wav_sweep_length <= 0.0 {
            return Err(invalid(
                "wav_sweep_length",
                format!("must be positive, got {}", self.wav_sweep_length),
            ));
        }

        Ok(())
    }

    /// Crop window as `(start, end)` in ms
    pub fn segment(&self) -> (f64, f64) {
        (self.segment_start, self.segment_end)
    }
}

fn invalid(key: &str, reason: String) -> RonflexError {
    RonflexError::InvalidConfig {
        key: key.to_string(),
        reason,
    }
}
