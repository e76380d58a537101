use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DetectError;
use crate::types::{Channel, PerChannel, Recording};

const TIMESTAMP_COLUMN: &str = "timestamp";
const MIN_ROWS: usize = 2;

const TEXT_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

// Spreadsheet serial dates count days from this epoch (non-1904 system).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const SERIAL_MAX: f64 = 2_958_465.0;

pub fn read_recording<P: AsRef<Path>>(path: P) -> Result<Recording, DetectError> {
    let path = path.as_ref();
    info!("Reading telemetry from {}", path.display());
    let file = File::open(path).map_err(|e| DetectError::io(path, e))?;
    read_from(file, path)
}

/// Parses telemetry rows from any reader; `origin` only labels errors and
/// log lines.
pub fn read_from<R: Read>(reader: R, origin: &Path) -> Result<Recording, DetectError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DetectError::csv(origin, e))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let timestamp_col = find(TIMESTAMP_COLUMN)
        .ok_or_else(|| DetectError::missing_column(TIMESTAMP_COLUMN, origin))?;
    let mut weight_cols = [0usize; 4];
    for channel in Channel::ALL {
        weight_cols[channel.index()] = find(channel.column_name())
            .ok_or_else(|| DetectError::missing_column(channel.column_name(), origin))?;
    }

    let mut timestamps = Vec::new();
    let mut channels: PerChannel<Vec<f64>> = PerChannel::default();
    let mut skipped = 0usize;

    for record in rdr.records() {
        let record = record.map_err(|e| DetectError::csv(origin, e))?;
        let raw_timestamp = record.get(timestamp_col).unwrap_or("");
        let Some(timestamp) = parse_timestamp(raw_timestamp) else {
            skipped += 1;
            continue;
        };
        timestamps.push(timestamp);
        for channel in Channel::ALL {
            // Unreadable weight cells become 0.0 so the channels stay aligned.
            let value = record
                .get(weight_cols[channel.index()])
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
            channels[channel].push(value);
        }
    }

    if skipped > 0 {
        warn!(
            "{}: skipped {} rows with unparsable timestamps",
            origin.display(),
            skipped
        );
    }
    if timestamps.len() < MIN_ROWS {
        return Err(DetectError::TooFewRows {
            path: origin.to_path_buf(),
            rows: timestamps.len(),
            minimum: MIN_ROWS,
        });
    }
    debug!("{}: {} usable rows", origin.display(), timestamps.len());

    Ok(Recording {
        timestamps,
        channels,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in TEXT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    raw.parse::<f64>().ok().and_then(serial_to_datetime)
}

fn serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || !(0.0..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let naive = epoch
        .checked_add_signed(chrono::Duration::days(days as i64))?
        .checked_add_signed(chrono::Duration::seconds(seconds))?;
    Some(Utc.from_utc_datetime(&naive))
}
