//! Signals and Spikes
//!
//! Windowed time series built from provider samples, and the threshold
//! detection that reduces them to spikes:
//! - `Signal` - cropped, ms-based trace with its detection threshold
//! - `SpikeDetector` - run detection with peak reduction
//! - `SpikeSet` - stimulus artifact split from the response spikes

mod detector;
mod series;
mod spike;

pub use detector::{detect_spikes, SpikeDetector};
pub use series::Signal;
pub use spike::{Spike, SpikeSet};
