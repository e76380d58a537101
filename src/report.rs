use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::Serialize;
use std::path::Path;

use crate::error::DetectError;
use crate::types::{Channel, PerChannel, SinusoidDetection, VacuumEvent};

/// One CSV line. Everything is preformatted text so blank columns and the
/// fixed decimal widths come out exactly as expected.
#[derive(Debug, Default, Serialize)]
struct ReportRow {
    detection_type: String,
    timestamp: String,
    weight_1_detection: String,
    weight_2_detection: String,
    weight_3_detection: String,
    weight_4_detection: String,
    frequency_hz: String,
    phase_radians: String,
    phase_degrees: String,
}

impl ReportRow {
    fn vacuum(event: &VacuumEvent) -> ReportRow {
        ReportRow {
            detection_type: "vacuum_event".to_string(),
            timestamp: format_timestamp(event.timestamp),
            ..ReportRow::default()
        }
    }

    fn sinusoid(detection: &SinusoidDetection) -> ReportRow {
        let timestamp = format_timestamp(detection.timestamp);
        let mut row = ReportRow {
            detection_type: format!("sinusoidal_weight_{}", detection.channel.number()),
            timestamp: timestamp.clone(),
            frequency_hz: format!("{:.3}", detection.frequency_hz),
            phase_radians: format!("{:.3}", detection.phase_radians),
            phase_degrees: format!("{:.1}", detection.phase_radians.to_degrees()),
            ..ReportRow::default()
        };
        let cell = match detection.channel {
            Channel::W1 => &mut row.weight_1_detection,
            Channel::W2 => &mut row.weight_2_detection,
            Channel::W3 => &mut row.weight_3_detection,
            Channel::W4 => &mut row.weight_4_detection,
        };
        *cell = timestamp;
        row
    }
}

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Vacuum events first, then every per-channel detection in channel order.
fn rows(
    detections: &PerChannel<Vec<SinusoidDetection>>,
    events: &[VacuumEvent],
) -> Vec<ReportRow> {
    let mut out: Vec<ReportRow> = events.iter().map(ReportRow::vacuum).collect();
    for (_, list) in detections.iter() {
        out.extend(list.iter().map(ReportRow::sinusoid));
    }
    out
}

pub fn write_report(
    path: &Path,
    detections: &PerChannel<Vec<SinusoidDetection>>,
    events: &[VacuumEvent],
) -> Result<(), DetectError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DetectError::csv(path, e))?;
    let all = rows(detections, events);
    debug!("{}: {} report rows", path.display(), all.len());
    for row in &all {
        writer.serialize(row).map_err(|e| DetectError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DetectError::io(path, e))?;
    Ok(())
}
