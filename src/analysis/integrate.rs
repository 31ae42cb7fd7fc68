//! Trapezoidal area integration

use super::error::AnalysisError;
use crate::config::IntegrationBound;
use crate::signal::Signal;

/// Trapezoidal rule over paired samples
///
/// Fewer than two samples integrate to zero.
pub fn trapezoid(times: &[f64], amps: &[f64]) -> f64 {
    times
        .windows(2)
        .zip(amps.windows(2))
        .map(|(t, a)| (t[1] - t[0]) * (a[0] + a[1]) / 2.0)
        .sum()
}

fn index_of(signal: &Signal, time: f64) -> Result<usize, AnalysisError> {
    signal
        .index_of(time)
        .ok_or(AnalysisError::SampleNotFound { time })
}

/// Area under `signal` between two of its sample times
///
/// Both times must be exact samples. With [`IntegrationBound::Exclusive`] the
/// sample at `end` is left out of the slice, so the last trapezoid is not
/// counted.
pub fn area_between(
    signal: &Signal,
    start: f64,
    end: f64,
    bound: IntegrationBound,
) -> Result<f64, AnalysisError> {
    let start_index = index_of(signal, start)?;
    let end_index = index_of(signal, end)?;
    let stop = match bound {
        IntegrationBound::Exclusive => end_index,
        IntegrationBound::Inclusive => end_index + 1,
    };
    if stop <= start_index {
        return Ok(0.0);
    }

    let range = start_index..stop;
    Ok(trapezoid(&signal.times()[range.clone()], &signal.amps()[range]))
}

/// Area over a fixed-width window anchored at `start`
///
/// The window end is snapped to the nearest sample before integrating.
pub fn control_area(
    signal: &Signal,
    start: f64,
    width: f64,
    bound: IntegrationBound,
) -> Result<f64, AnalysisError> {
    let guess = start + width;
    let end = signal
        .nearest_time(guess)
        .ok_or(AnalysisError::SampleNotFound { time: guess })?;
    area_between(signal, start, end, bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn unit_grid(amps: &[f64]) -> Signal {
        let times = (0..amps.len()).map(|i| i as f64).collect();
        Signal::new(times, amps.to_vec(), 0.15).unwrap()
    }

    /// Reference trapezoid written out the long way
    fn reference(times: &[f64], amps: &[f64]) -> f64 {
        let mut area = 0.0;
        for i in 1..times.len() {
            area += (times[i] - times[i - 1]) * (amps[i] + amps[i - 1]) * 0.5;
        }
        area
    }

    #[test]
    fn test_triangle_area() {
        assert_relative_eq!(trapezoid(&[0.0, 1.0, 2.0], &[0.0, 2.0, 0.0]), 2.0);
    }

    #[test]
    fn test_matches_reference_on_uneven_grid() {
        let times = [0.0, 0.5, 1.7, 2.0, 3.9, 4.0];
        let amps = [0.1, 0.4, 0.3, 0.9, 0.2, 0.0];
        assert_relative_eq!(trapezoid(&times, &amps), reference(&times, &amps), epsilon = 1e-12);
    }

    #[test_case(&[], &[] ; "empty")]
    #[test_case(&[1.0], &[3.0] ; "single sample")]
    fn test_degenerate_slices(times: &[f64], amps: &[f64]) {
        assert_eq!(trapezoid(times, amps), 0.0);
    }

    #[test_case(IntegrationBound::Exclusive, 2.0 ; "exclusive")]
    #[test_case(IntegrationBound::Inclusive, 3.0 ; "inclusive")]
    fn test_end_bound(bound: IntegrationBound, expected: f64) {
        // Exclusive drops the trapezoid between samples 3 and 4
        let signal = unit_grid(&[0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        let area = area_between(&signal, 1.0, 4.0, bound).unwrap();
        assert_relative_eq!(area, expected);
    }

    #[test]
    fn test_equal_bounds() {
        let signal = unit_grid(&[0.0, 1.0, 1.0]);
        assert_eq!(
            area_between(&signal, 1.0, 1.0, IntegrationBound::Exclusive).unwrap(),
            0.0
        );
        assert_eq!(
            area_between(&signal, 1.0, 1.0, IntegrationBound::Inclusive).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_time_not_in_signal() {
        let signal = unit_grid(&[0.0, 1.0, 1.0]);
        assert_eq!(
            area_between(&signal, 0.5, 2.0, IntegrationBound::Exclusive),
            Err(AnalysisError::SampleNotFound { time: 0.5 })
        );
    }

    #[test]
    fn test_control_area_window() {
        let signal = unit_grid(&[0.0, 0.0, 2.0, 0.0, 0.0, 4.0, 0.0]);

        let area = control_area(&signal, 1.0, 3.0, IntegrationBound::Exclusive).unwrap();

        assert_relative_eq!(area, 2.0);
    }

    #[test]
    fn test_control_area_snaps_window_end() {
        let signal = unit_grid(&[0.0, 0.0, 2.0, 0.0, 0.0, 4.0, 0.0]);

        let area = control_area(&signal, 1.0, 2.8, IntegrationBound::Exclusive).unwrap();

        assert_relative_eq!(area, 2.0);
    }
}
