use log::debug;
use plotters::prelude::*;
use std::path::Path;

use crate::detect::Analysis;
use crate::error::DetectError;
use crate::types::{Channel, Recording};
use crate::util::seconds_between;

const CHART_SIZE: (u32, u32) = (1400, 700);
const CHANNEL_COLORS: [RGBColor; 4] = [BLUE, GREEN, MAGENTA, CYAN];

/// Draws the corrected channels, their sum, per-channel detection markers
/// and vacuum-event lines into one PNG overlay.
pub fn render(path: &Path, recording: &Recording, analysis: &Analysis) -> Result<(), DetectError> {
    let first = recording.timestamps[0];
    let elapsed: Vec<f64> = recording
        .timestamps
        .iter()
        .map(|&ts| seconds_between(ts, first))
        .collect();
    let x_max = elapsed.last().copied().unwrap_or(1.0).max(1e-3);

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, signal) in analysis.corrected.iter() {
        for &v in signal {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
    }
    for &v in &analysis.total {
        y_min = y_min.min(v);
        y_max = y_max.max(v);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = -1.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1.0);
    let y_range = (y_min - pad)..(y_max + pad);

    debug!("rendering chart to {}", path.display());
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DetectError::render(path, e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption("Weight channels and detections", ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_range)
        .map_err(|e| DetectError::render(path, e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Weight (zero-referenced)")
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| DetectError::render(path, e.to_string()))?;

    for channel in Channel::ALL {
        let color = CHANNEL_COLORS[channel.index()];
        let signal = &analysis.corrected[channel];
        chart
            .draw_series(LineSeries::new(
                elapsed.iter().copied().zip(signal.iter().copied()),
                &color,
            ))
            .map_err(|e| DetectError::render(path, e.to_string()))?
            .label(channel.column_name())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .draw_series(LineSeries::new(
            elapsed.iter().copied().zip(analysis.total.iter().copied()),
            BLACK.stroke_width(2),
        ))
        .map_err(|e| DetectError::render(path, e.to_string()))?
        .label("total")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    for channel in Channel::ALL {
        let color = CHANNEL_COLORS[channel.index()];
        for detection in &analysis.detections[channel] {
            let x = elapsed[detection.index];
            let y = analysis.corrected[channel][detection.index];
            chart
                .draw_series(std::iter::once(Circle::new((x, y), 4, color.filled())))
                .map_err(|e| DetectError::render(path, e.to_string()))?;
            chart
                .draw_series(LineSeries::new(
                    vec![(x, y_min - pad), (x, y_max + pad)],
                    color.mix(0.35),
                ))
                .map_err(|e| DetectError::render(path, e.to_string()))?;
        }
    }

    for (i, event) in analysis.events.iter().enumerate() {
        let x = seconds_between(event.timestamp, first);
        let series = chart
            .draw_series(LineSeries::new(
                vec![(x, y_min - pad), (x, y_max + pad)],
                RED.stroke_width(2),
            ))
            .map_err(|e| DetectError::render(path, e.to_string()))?;
        if i == 0 {
            series.label("vacuum event").legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2))
            });
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| DetectError::render(path, e.to_string()))?;

    root.present()
        .map_err(|e| DetectError::render(path, e.to_string()))?;
    Ok(())
}
