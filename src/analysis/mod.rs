//! Per-sweep Analysis
//!
//! Turns the spikes of a sweep into its metrics:
//! - Event boundaries from the outermost response spikes
//! - Trapezoidal response and control areas
//! - `Sweep`, which memoizes every derived value

mod boundaries;
pub mod error;
mod integrate;
mod record;
mod sweep;

pub use boundaries::{infer_event_boundaries, EventBoundaries};
pub use error::AnalysisError;
pub use integrate::{area_between, control_area, trapezoid};
pub use record::SweepRecord;
pub use sweep::{Sweep, SweepOptions};
