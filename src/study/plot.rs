//! Sweep plots
//!
//! Draws a sweep's rectified signal as SVG, with the detected spikes marked
//! and the inferred response window shaded.

use plotters::{
    chart::ChartBuilder,
    element::{Circle, PathElement, Rectangle},
    prelude::{IntoDrawingArea, SVGBackend},
    series::{LineSeries, PointSeries},
    style::{Color, IntoFont, ShapeStyle, BLACK, BLUE, RED, WHITE},
};
use tracing::debug;

use crate::analysis::Sweep;
use crate::error::{Result, RonflexError};
use crate::source::ChannelInfo;

/// Plot size in pixels
pub const PLOT_SIZE: (u32, u32) = (1024, 600);

fn plot_error(e: impl std::fmt::Display) -> RonflexError {
    RonflexError::Plot {
        reason: e.to_string(),
    }
}

/// SVG plot of one sweep, or `None` when its cropped signal is empty
///
/// Sweeps that failed analysis are still drawn, without markers.
pub fn sweep_svg(sweep: &Sweep, study: &str, channel: &ChannelInfo) -> Result<Option<String>> {
    let signal = sweep.abs_signal();
    let (Some(&first), Some(&last)) = (signal.times().first(), signal.times().last()) else {
        debug!(study, sweep = sweep.id(), "Nothing to plot");
        return Ok(None);
    };
    let x_range = if last > first {
        first..last
    } else {
        first - 1.0..first + 1.0
    };
    let peak = signal.amps().iter().copied().fold(0.0, f64::max);
    let y_max = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .margin(5)
            .caption(
                format!("{} sweep {}", study, sweep.id()),
                ("sans-serif", 30.0).into_font(),
            )
            .build_cartesian_2d(x_range, 0.0..y_max)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Time (ms)")
            .y_desc(format!("{} ({})", channel.name, channel.units))
            .draw()
            .map_err(plot_error)?;

        if let Ok(window) = sweep.event_boundaries() {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(window.start, 0.0), (window.end, y_max)],
                    BLUE.mix(0.1).filled(),
                )))
                .map_err(plot_error)?;
        }

        chart
            .draw_series(LineSeries::new(signal.samples(), &BLUE))
            .map_err(plot_error)?
            .label("rectified")
            .legend(|(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], BLUE));

        if let Ok(spikes) = sweep.abs_spikes() {
            let stimulus: PointSeries<_, _, Circle<_, _>, _> = PointSeries::new(
                std::iter::once((spikes.stimulus.time, spikes.stimulus.amplitude)),
                5,
                ShapeStyle::from(&BLACK).filled(),
            );
            chart
                .draw_series(stimulus)
                .map_err(plot_error)?
                .label("stimulus")
                .legend(|(x, y)| Circle::new((x, y), 5, BLACK.filled()));

            let responses: PointSeries<_, _, Circle<_, _>, _> = PointSeries::new(
                spikes.responses.iter().map(|s| (s.time, s.amplitude)),
                4,
                ShapeStyle::from(&RED).filled(),
            );
            chart
                .draw_series(responses)
                .map_err(plot_error)?
                .label("responses")
                .legend(|(x, y)| Circle::new((x, y), 4, RED.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE)
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }
    Ok(Some(svg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SweepOptions;
    use crate::signal::Signal;

    fn channel() -> ChannelInfo {
        ChannelInfo {
            name: "IN 2".to_string(),
            units: "V".to_string(),
        }
    }

    fn sweep(amps: Vec<f64>) -> Sweep {
        let times = (0..amps.len()).map(|i| i as f64).collect();
        let raw = Signal::new(times, amps, 0.1).unwrap();
        let abs = raw.rectified(0.15);
        Sweep::new(4, raw, abs, 20.0, 5.0, SweepOptions::default())
    }

    #[test]
    fn test_evoked_sweep_is_plotted() {
        let mut amps = vec![0.0; 61];
        amps[0] = 5.0;
        amps[20] = -0.3;
        amps[35] = 0.25;

        let svg = sweep_svg(&sweep(amps), "24415011", &channel())
            .unwrap()
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("24415011 sweep 4"));
        assert!(svg.contains("IN 2 (V)"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_flat_sweep_is_plotted_without_markers() {
        let svg = sweep_svg(&sweep(vec![0.0; 10]), "flat", &channel())
            .unwrap()
            .unwrap();

        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_empty_signal_has_no_plot() {
        let empty = Sweep::new(
            0,
            Signal::new(vec![], vec![], 0.1).unwrap(),
            Signal::new(vec![], vec![], 0.15).unwrap(),
            20.0,
            5.0,
            SweepOptions::default(),
        );
        assert_eq!(sweep_svg(&empty, "empty", &channel()).unwrap(), None);
    }
}
