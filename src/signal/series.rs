//! Windowed signal construction.

use crate::error::{Result, RonflexError};

/// Milliseconds per second; providers report sample times in seconds
const MS_PER_SECOND: f64 = 1000.0;

/// Immutable, windowed time series in milliseconds
///
/// `times` is strictly increasing and aligned by index with `amps`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    times: Vec<f64>,
    amps: Vec<f64>,
    threshold: f64,
}

impl Signal {
    /// Create a signal from ms times and amplitudes
    ///
    /// # Errors
    /// * `ProviderFailure` - if the arrays differ in length or the times are
    ///   not strictly increasing
    pub fn new(times: Vec<f64>, amps: Vec<f64>, threshold: f64) -> Result<Self> {
        if times.len() != amps.len() {
            return Err(RonflexError::provider(
                "signal",
                format!(
                    "{} sample times for {} amplitudes",
                    times.len(),
                    amps.len()
                ),
            ));
        }
        if let Some(pair) = times.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(RonflexError::provider(
                "signal",
                format!("sample times not increasing at {} ms", pair[1]),
            ));
        }

        Ok(Self {
            times,
            amps,
            threshold,
        })
    }

    /// Build a signal from provider samples
    ///
    /// Times are converted from seconds to ms and only samples strictly
    /// inside `(start_ms, end_ms)` are kept, in their original order. An empty
    /// window is valid and simply yields no spikes.
    pub fn from_seconds(
        times_s: &[f64],
        amps: &[f64],
        (start_ms, end_ms): (f64, f64),
        threshold: f64,
    ) -> Result<Self> {
        if times_s.len() != amps.len() {
            return Err(RonflexError::provider(
                "sweep",
                format!(
                    "{} sample times for {} amplitudes",
                    times_s.len(),
                    amps.len()
                ),
            ));
        }

        let (times, amps) = times_s
            .iter()
            .zip(amps)
            .map(|(&t, &amp)| (t * MS_PER_SECOND, amp))
            .filter(|&(t, _)| start_ms < t && t < end_ms)
            .unzip();

        Self::new(times, amps, threshold)
    }

    /// Rectified copy of this signal: same times, absolute amplitudes
    pub fn rectified(&self, threshold: f64) -> Self {
        Self {
            times: self.times.clone(),
            amps: self.amps.iter().map(|amp| amp.abs()).collect(),
            threshold,
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn amps(&self) -> &[f64] {
        &self.amps
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Samples as `(time, amplitude)` pairs in time order
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.amps.iter().copied())
    }

    /// Index of the first sample whose time is exactly `time`
    pub fn index_of(&self, time: f64) -> Option<usize> {
        let index = self.times.partition_point(|&t| t < time);
        (self.times.get(index) == Some(&time)).then_some(index)
    }

    /// Sample time nearest to `guess`
    ///
    /// Equal distances resolve to the earlier sample. Returns `None` for an
    /// empty signal.
    pub fn nearest_time(&self, guess: f64) -> Option<f64> {
        let index = self.times.partition_point(|&t| t < guess);
        let after = self.times.get(index).copied();
        let before = index.checked_sub(1).and_then(|i| self.times.get(i).copied());

        match (before, after) {
            (Some(b), Some(a)) => {
                if (guess - b).abs() <= (a - guess).abs() {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }
}
