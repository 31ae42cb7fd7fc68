//! Flat per-sweep result handed to the exporters.

use serde::{Deserialize, Serialize};

use crate::signal::Spike;

/// Every metric of one successfully analysed sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub sweep_id: usize,
    pub stimulus_time: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub event_duration: f64,
    pub area: f64,
    pub control_area: f64,
    pub boundary_delay: f64,
    pub control_window_width: f64,
    /// Spikes of the raw signal
    pub raw_spikes: Vec<Spike>,
    /// Rectified spikes without the stimulus artifact
    pub response_spikes: Vec<Spike>,
}

impl SweepRecord {
    /// Column names of the scalar fields, in [`SweepRecord::scalar_values`] order
    pub const SCALAR_COLUMNS: [&'static str; 9] = [
        "Sweep ID",
        "Stim Time",
        "Start Time",
        "End Time",
        "Event Duration",
        "Area",
        "Control Area",
        "Ms Delay",
        "Control Window",
    ];

    /// Scalar fields rendered for tabular output
    pub fn scalar_values(&self) -> [String; 9] {
        [
            self.sweep_id.to_string(),
            self.stimulus_time.to_string(),
            self.start_time.to_string(),
            self.end_time.to_string(),
            self.event_duration.to_string(),
            self.area.to_string(),
            self.control_area.to_string(),
            self.boundary_delay.to_string(),
            self.control_window_width.to_string(),
        ]
    }

    /// Human readable block
    pub fn to_txt(&self) -> String {
        let raw_spikes: String = self.raw_spikes.iter().map(spike_line).collect();
        let response_spikes: String = self.response_spikes.iter().map(spike_line).collect();
        format!(
            "Sweep ID: {}\n\
             Stim Time: {}\n\
             Start Time: {}\n\
             End Time: {}\n\
             Event Duration: {}\n\
             Area: {}\n\
             Control Area: {}\n\
             Ms Delay: {}\n\
             Control Window: {}\n\
             \n\
             Raw Spikes:\n\
             {}\n\
             Abs Spikes:\n\
             {}",
            self.sweep_id,
            self.stimulus_time,
            self.start_time,
            self.end_time,
            self.event_duration,
            self.area,
            self.control_area,
            self.boundary_delay,
            self.control_window_width,
            raw_spikes,
            response_spikes,
        )
    }
}

fn spike_line(spike: &Spike) -> String {
    format!("  t={} ms amp={}\n", spike.time, spike.amplitude)
}
