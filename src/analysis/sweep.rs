//! Sweep orchestration
//!
//! A `Sweep` owns a raw and a rectified signal and derives its metrics on
//! first access. Each derived value sits behind its own `OnceLock`, so it is
//! computed at most once per sweep even when several threads ask for it
//! concurrently; failures are memoized the same way.

use std::sync::OnceLock;

use super::boundaries::{infer_event_boundaries, EventBoundaries};
use super::error::AnalysisError;
use super::integrate::{area_between, control_area};
use super::record::SweepRecord;
use crate::config::{AnalysisConfig, IntegrationBound, TrailingRunPolicy};
use crate::error::Result;
use crate::signal::{detect_spikes, Signal, Spike, SpikeSet};

/// Detection and integration policies applied to a sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOptions {
    pub trailing_run: TrailingRunPolicy,
    pub integration_bound: IntegrationBound,
}

impl From<&AnalysisConfig> for SweepOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            trailing_run: config.trailing_run,
            integration_bound: config.integration_bound,
        }
    }
}

/// One recorded sweep and its lazily derived metrics
#[derive(Debug)]
pub struct Sweep {
    id: usize,
    raw_signal: Signal,
    abs_signal: Signal,
    control_window_width: f64,
    boundary_delay: f64,
    options: SweepOptions,

    raw_spikes: OnceLock<Vec<Spike>>,
    abs_spikes: OnceLock<std::result::Result<SpikeSet, AnalysisError>>,
    event_boundaries: OnceLock<std::result::Result<EventBoundaries, AnalysisError>>,
    area: OnceLock<std::result::Result<f64, AnalysisError>>,
    control_area: OnceLock<std::result::Result<f64, AnalysisError>>,
}

impl Sweep {
    pub fn new(
        id: usize,
        raw_signal: Signal,
        abs_signal: Signal,
        control_window_width: f64,
        boundary_delay: f64,
        options: SweepOptions,
    ) -> Self {
        Self {
            id,
            raw_signal,
            abs_signal,
            control_window_width,
            boundary_delay,
            options,
            raw_spikes: OnceLock::new(),
            abs_spikes: OnceLock::new(),
            event_boundaries: OnceLock::new(),
            area: OnceLock::new(),
            control_area: OnceLock::new(),
        }
    }

    /// Build a sweep from provider samples (times in seconds)
    ///
    /// Both signals are cropped to the configured segment; the raw signal
    /// uses `default_tolerance` and the rectified one `default_abs_tolerance`.
    pub fn from_samples(
        id: usize,
        times_s: &[f64],
        amps: &[f64],
        config: &AnalysisConfig,
    ) -> Result<Self> {
        let raw_signal =
            Signal::from_seconds(times_s, amps, config.segment(), config.default_tolerance)?;
        let abs_signal = raw_signal.rectified(config.default_abs_tolerance);
        Ok(Self::new(
            id,
            raw_signal,
            abs_signal,
            config.default_curve_check,
            config.default_ms_delay,
            SweepOptions::from(config),
        ))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn raw_signal(&self) -> &Signal {
        &self.raw_signal
    }

    pub fn abs_signal(&self) -> &Signal {
        &self.abs_signal
    }

    pub fn control_window_width(&self) -> f64 {
        self.control_window_width
    }

    pub fn boundary_delay(&self) -> f64 {
        self.boundary_delay
    }

    pub fn options(&self) -> SweepOptions {
        self.options
    }

    /// Spikes of the raw signal
    pub fn raw_spikes(&self) -> &[Spike] {
        self.raw_spikes
            .get_or_init(|| detect_spikes(&self.raw_signal, self.options.trailing_run))
    }

    /// Spikes of the rectified signal, split into stimulus and responses
    pub fn abs_spikes(&self) -> std::result::Result<&SpikeSet, AnalysisError> {
        self.abs_spikes
            .get_or_init(|| {
                SpikeSet::split(&detect_spikes(&self.abs_signal, self.options.trailing_run))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Stimulus artifact
    pub fn stimulus(&self) -> std::result::Result<Spike, AnalysisError> {
        self.abs_spikes().map(|set| set.stimulus)
    }

    /// Response window snapped to the rectified signal's samples
    pub fn event_boundaries(&self) -> std::result::Result<EventBoundaries, AnalysisError> {
        self.event_boundaries
            .get_or_init(|| {
                let responses = &self.abs_spikes()?.responses;
                infer_event_boundaries(responses, self.boundary_delay, &self.abs_signal)
            })
            .clone()
    }

    pub fn event_duration(&self) -> std::result::Result<f64, AnalysisError> {
        self.event_boundaries().map(|b| b.duration())
    }

    /// Area under the rectified curve across the event boundaries
    pub fn area(&self) -> std::result::Result<f64, AnalysisError> {
        self.area
            .get_or_init(|| {
                let EventBoundaries { start, end } = self.event_boundaries()?;
                area_between(&self.abs_signal, start, end, self.options.integration_bound)
            })
            .clone()
    }

    /// Area over the control window anchored at the event start
    pub fn control_area(&self) -> std::result::Result<f64, AnalysisError> {
        self.control_area
            .get_or_init(|| {
                let start = self.event_boundaries()?.start;
                control_area(
                    &self.abs_signal,
                    start,
                    self.control_window_width,
                    self.options.integration_bound,
                )
            })
            .clone()
    }

    /// All metrics, or the first failure; never a partial record
    pub fn record(&self) -> std::result::Result<SweepRecord, AnalysisError> {
        let spikes = self.abs_spikes()?;
        let boundaries = self.event_boundaries()?;
        Ok(SweepRecord {
            sweep_id: self.id,
            stimulus_time: spikes.stimulus.time,
            start_time: boundaries.start,
            end_time: boundaries.end,
            event_duration: boundaries.duration(),
            area: self.area()?,
            control_area: self.control_area()?,
            boundary_delay: self.boundary_delay,
            control_window_width: self.control_window_width,
            raw_spikes: self.raw_spikes().to_vec(),
            response_spikes: spikes.responses.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    /// 1 ms grid from 0 to 60 ms with a stimulus at 0 and bumps at 20 and 35
    fn evoked_sweep() -> Sweep {
        let times: Vec<f64> = (0..=60).map(|i| i as f64).collect();
        let mut amps = vec![0.0; times.len()];
        amps[0] = 5.0;
        amps[20] = -0.3;
        amps[35] = 0.25;

        let raw = Signal::new(times, amps, 0.1).unwrap();
        let abs = raw.rectified(0.15);
        Sweep::new(0, raw, abs, 20.0, 5.0, SweepOptions::default())
    }

    #[test]
    fn test_evoked_response_metrics() {
        let sweep = evoked_sweep();

        assert_eq!(sweep.stimulus().unwrap(), Spike::new(5.0, 0.0));
        assert_eq!(
            sweep.event_boundaries().unwrap(),
            EventBoundaries { start: 15.0, end: 40.0 }
        );
        assert_eq!(sweep.event_duration().unwrap(), 25.0);
        assert_relative_eq!(sweep.area().unwrap(), 0.55, epsilon = 1e-12);
        assert_relative_eq!(sweep.control_area().unwrap(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_spikes_use_raw_threshold_and_polarity() {
        let sweep = evoked_sweep();
        // The negative deflection at 20 ms is invisible to the raw detector
        assert_eq!(
            sweep.raw_spikes(),
            &[Spike::new(5.0, 0.0), Spike::new(0.25, 35.0)]
        );
    }

    #[test]
    fn test_area_is_memoized() {
        let sweep = evoked_sweep();
        let first = sweep.area().unwrap();
        let second = sweep.area().unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_concurrent_first_access_agrees() {
        let sweep = evoked_sweep();
        let areas: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| sweep.area().unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(areas.iter().all(|a| a.to_bits() == areas[0].to_bits()));
    }

    #[test]
    fn test_flat_sweep_reports_empty_spike_set() {
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let raw = Signal::new(times, vec![0.01; 10], 0.1).unwrap();
        let abs = raw.rectified(0.15);
        let sweep = Sweep::new(1, raw, abs, 20.0, 5.0, SweepOptions::default());

        assert!(sweep.raw_spikes().is_empty());
        assert_eq!(sweep.stimulus(), Err(AnalysisError::EmptySpikeSet));
        assert_eq!(sweep.area(), Err(AnalysisError::EmptySpikeSet));
        assert_eq!(sweep.record(), Err(AnalysisError::EmptySpikeSet));
    }

    #[test]
    fn test_stimulus_only_sweep_has_no_responses() {
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut amps = vec![0.0; 10];
        amps[2] = 3.0;
        let raw = Signal::new(times, amps, 0.1).unwrap();
        let abs = raw.rectified(0.15);
        let sweep = Sweep::new(2, raw, abs, 20.0, 5.0, SweepOptions::default());

        assert_eq!(sweep.stimulus().unwrap().time, 2.0);
        assert_eq!(sweep.event_boundaries(), Err(AnalysisError::EmptySpikeSet));
    }

    #[test]
    fn test_record_collects_all_fields() {
        let record = evoked_sweep().record().unwrap();

        assert_eq!(record.sweep_id, 0);
        assert_eq!(record.stimulus_time, 0.0);
        assert_eq!((record.start_time, record.end_time), (15.0, 40.0));
        assert_eq!(record.boundary_delay, 5.0);
        assert_eq!(record.control_window_width, 20.0);
        assert_eq!(
            record.response_spikes,
            vec![Spike::new(0.3, 20.0), Spike::new(0.25, 35.0)]
        );
    }

    #[test]
    fn test_from_samples_crops_both_signals() {
        let config = AnalysisConfig {
            segment_start: 0.0,
            segment_end: 4.0,
            ..AnalysisConfig::default()
        };
        let times_s = [0.0, 0.001, 0.002, 0.003, 0.004];
        let amps = [9.0, -0.5, 0.2, 0.0, 9.0];

        let sweep = Sweep::from_samples(7, &times_s, &amps, &config).unwrap();

        assert_eq!(sweep.id(), 7);
        assert_eq!(sweep.raw_signal().len(), 3);
        assert_eq!(sweep.abs_signal().amps(), &[0.5, 0.2, 0.0]);
        assert_eq!(sweep.raw_signal().threshold(), 0.1);
        assert_eq!(sweep.abs_signal().threshold(), 0.15);
        assert_eq!(sweep.boundary_delay(), 5.0);
        assert_eq!(sweep.control_window_width(), 90.0);
    }
}
