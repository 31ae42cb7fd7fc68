//! Threshold run detection
//!
//! A sample is active when its amplitude is strictly above the threshold.
//! Consecutive active samples form a run; each run is reduced to its peak
//! sample, the first one reaching the run's maximum.

use super::{Signal, Spike};
use crate::config::TrailingRunPolicy;

/// Streaming run detector
///
/// Feed samples in time order through [`SpikeDetector::signal`]; a spike is
/// emitted when a run is closed by an inactive sample. Call
/// [`SpikeDetector::finish`] at the end of data to apply the trailing-run
/// policy to a run that never closed.
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    threshold: f64,
    trailing: TrailingRunPolicy,
    /// Peak of the open run, if any
    peak: Option<Spike>,
}

impl SpikeDetector {
    pub fn new(threshold: f64, trailing: TrailingRunPolicy) -> Self {
        Self {
            threshold,
            trailing,
            peak: None,
        }
    }

    /// Process one sample, returning the peak of a run this sample closes
    pub fn signal(&mut self, time: f64, amplitude: f64) -> Option<Spike> {
        if amplitude > self.threshold {
            if self.peak.map_or(true, |peak| amplitude > peak.amplitude) {
                self.peak = Some(Spike::new(amplitude, time));
            }
            None
        } else {
            self.peak.take()
        }
    }

    /// End of data: resolve a run that is still open
    pub fn finish(&mut self) -> Option<Spike> {
        let open = self.peak.take();
        match self.trailing {
            TrailingRunPolicy::Discard => None,
            TrailingRunPolicy::Close => open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.peak.is_some()
    }
}

/// Detect the spikes of a signal against its own threshold
pub fn detect_spikes(signal: &Signal, trailing: TrailingRunPolicy) -> Vec<Spike> {
    let mut detector = SpikeDetector::new(signal.threshold(), trailing);
    let mut spikes: Vec<Spike> = signal
        .samples()
        .filter_map(|(time, amplitude)| detector.signal(time, amplitude))
        .collect();
    spikes.extend(detector.finish());
    spikes
}
