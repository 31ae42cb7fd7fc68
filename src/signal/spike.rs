//! Spike values and the stimulus split.

use serde::{Deserialize, Serialize};

use crate::analysis::error::AnalysisError;

/// Peak sample of an above-threshold run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub amplitude: f64,
    /// Time in ms, always a sample time of the originating signal
    pub time: f64,
}

impl Spike {
    pub fn new(amplitude: f64, time: f64) -> Self {
        Self { amplitude, time }
    }
}

/// Stimulus artifact and the response spikes that follow it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeSet {
    pub stimulus: Spike,
    /// Remaining spikes in detection order
    pub responses: Vec<Spike>,
}

impl SpikeSet {
    /// Separate the largest spike (the stimulus artifact) from the rest
    ///
    /// Ties go to the first spike in input order. Exactly one spike is
    /// removed; the input is left untouched.
    pub fn split(spikes: &[Spike]) -> Result<Self, AnalysisError> {
        let stimulus_index = spikes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (index, spike)| match best {
                Some((_, amplitude)) if spike.amplitude <= amplitude => best,
                _ => Some((index, spike.amplitude)),
            })
            .map(|(index, _)| index)
            .ok_or(AnalysisError::EmptySpikeSet)?;

        let responses = spikes
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != stimulus_index)
            .map(|(_, spike)| *spike)
            .collect();

        Ok(Self {
            stimulus: spikes[stimulus_index],
            responses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_takes_largest_amplitude() {
        let spikes = [Spike::new(0.2, 1.0), Spike::new(0.3, 3.0)];

        let set = SpikeSet::split(&spikes).unwrap();

        assert_eq!(set.stimulus, Spike::new(0.3, 3.0));
        assert_eq!(set.responses, vec![Spike::new(0.2, 1.0)]);
    }

    #[test]
    fn test_split_tie_takes_first() {
        let spikes = [
            Spike::new(0.1, 1.0),
            Spike::new(0.5, 2.0),
            Spike::new(0.5, 3.0),
        ];

        let set = SpikeSet::split(&spikes).unwrap();

        assert_eq!(set.stimulus, Spike::new(0.5, 2.0));
        assert_eq!(set.responses, vec![Spike::new(0.1, 1.0), Spike::new(0.5, 3.0)]);
    }

    #[test]
    fn test_split_removes_only_one_equal_spike() {
        let spikes = [Spike::new(0.5, 2.0), Spike::new(0.5, 2.0)];

        let set = SpikeSet::split(&spikes).unwrap();

        assert_eq!(set.responses.len(), 1);
        assert_eq!(spikes.len(), 2);
    }

    #[test]
    fn test_split_empty() {
        assert_eq!(SpikeSet::split(&[]), Err(AnalysisError::EmptySpikeSet));
    }

    #[test]
    fn test_single_spike_leaves_no_responses() {
        let set = SpikeSet::split(&[Spike::new(4.0, 0.0)]).unwrap();
        assert!(set.responses.is_empty());
    }
}
