//! Event boundary inference
//!
//! The response window runs from the earliest response spike minus the delay
//! to the latest response spike plus the delay, each end snapped to the
//! nearest sample of the rectified signal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AnalysisError;
use crate::signal::{Signal, Spike};

/// Inferred `(start, end)` of an evoked response, in ms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBoundaries {
    pub start: f64,
    pub end: f64,
}

impl EventBoundaries {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Earliest and latest spikes, first occurrence on equal times
fn bounding_spikes(spikes: &[Spike]) -> Option<(Spike, Spike)> {
    let (first, rest) = spikes.split_first()?;
    Some(rest.iter().fold((*first, *first), |(earliest, latest), &spike| {
        (
            if spike.time < earliest.time { spike } else { earliest },
            if spike.time > latest.time { spike } else { latest },
        )
    }))
}

/// Derive the response window of a sweep
///
/// # Errors
/// * `EmptySpikeSet` - if there are no response spikes
/// * `SampleNotFound` - if `signal` has no samples to snap to
pub fn infer_event_boundaries(
    responses: &[Spike],
    delay: f64,
    signal: &Signal,
) -> Result<EventBoundaries, AnalysisError> {
    let (earliest, latest) = bounding_spikes(responses).ok_or(AnalysisError::EmptySpikeSet)?;

    let guess_start = earliest.time - delay;
    let guess_end = latest.time + delay;

    let snap = |guess: f64| {
        signal
            .nearest_time(guess)
            .ok_or(AnalysisError::SampleNotFound { time: guess })
    };
    let boundaries = EventBoundaries {
        start: snap(guess_start)?,
        end: snap(guess_end)?,
    };

    debug!(
        earliest = earliest.time,
        latest = latest.time,
        start = boundaries.start,
        end = boundaries.end,
        "Inferred event boundaries"
    );
    Ok(boundaries)
}
