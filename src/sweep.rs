use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::detect;
use crate::error::DetectError;
use crate::report::format_timestamp;
use crate::telemetry;
use crate::types::DetectionParameters;

const WIN_SIZES_SEC: [f64; 5] = [0.1, 0.25, 0.5, 1.0, 2.0];
const RATIO_THRESHOLDS: [f64; 5] = [0.1, 0.25, 0.5, 0.75, 0.9];
const CO_DETECTION_WINDOWS_SEC: [f64; 5] = [0.02, 0.05, 0.1, 0.25, 0.5];

/// One grid point of the sweep output CSV.
#[derive(Debug, Serialize)]
struct SweepRow {
    win_size_sec: f64,
    power_ratio_thresh: f64,
    co_detection_window_sec: f64,
    num_vacuum_events: usize,
    num_sinusoid_detections: usize,
    success: bool,
    vacuum_detected: bool,
    first_vacuum_time: Option<String>,
}

/// A grid point that found at least one vacuum event.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepHit {
    pub win_size_sec: f64,
    pub power_ratio_threshold: f64,
    pub co_detection_window_sec: f64,
    pub events: usize,
}

#[derive(Debug)]
pub struct SweepReport {
    pub results_path: PathBuf,
    pub combinations: usize,
    pub hits: Vec<SweepHit>,
}

/// Runs the detection grid over one telemetry file and writes
/// `parameter_sweep_results.csv` next to it. The file is read once; every
/// combination reuses the same recording.
pub fn run_sweep(path: &Path, base: &DetectionParameters) -> Result<SweepReport, DetectError> {
    let recording = telemetry::read_recording(path)?;
    let combinations = WIN_SIZES_SEC.len() * RATIO_THRESHOLDS.len() * CO_DETECTION_WINDOWS_SEC.len();
    info!(
        "sweeping {} parameter combinations over {}",
        combinations,
        path.display()
    );

    let mut rows = Vec::with_capacity(combinations);
    let mut hits = Vec::new();

    for &win_size_sec in &WIN_SIZES_SEC {
        for &power_ratio_threshold in &RATIO_THRESHOLDS {
            for &co_detection_window_sec in &CO_DETECTION_WINDOWS_SEC {
                let params = DetectionParameters {
                    win_size_sec,
                    power_ratio_threshold,
                    co_detection_window_sec,
                    // The gap must track the swept co-detection window, so any
                    // fixed override from the base parameters is dropped.
                    min_gap_samples: None,
                    ..base.clone()
                };

                let mut row = SweepRow {
                    win_size_sec,
                    power_ratio_thresh: power_ratio_threshold,
                    co_detection_window_sec,
                    num_vacuum_events: 0,
                    num_sinusoid_detections: 0,
                    success: false,
                    vacuum_detected: false,
                    first_vacuum_time: None,
                };

                match detect::analyze(&recording, &params) {
                    Ok(analysis) => {
                        row.num_vacuum_events = analysis.events.len();
                        row.num_sinusoid_detections = analysis.detection_count();
                        row.success = true;
                        row.vacuum_detected = !analysis.events.is_empty();
                        row.first_vacuum_time = analysis
                            .events
                            .first()
                            .map(|event| format_timestamp(event.timestamp));
                        if row.vacuum_detected {
                            hits.push(SweepHit {
                                win_size_sec,
                                power_ratio_threshold,
                                co_detection_window_sec,
                                events: row.num_vacuum_events,
                            });
                        }
                    }
                    Err(err) => {
                        warn!(
                            "combination win_size={} ratio={} codet={} failed: {}",
                            win_size_sec, power_ratio_threshold, co_detection_window_sec, err
                        );
                    }
                }
                rows.push(row);
            }
        }
    }

    let results_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("parameter_sweep_results.csv");
    let mut writer =
        csv::Writer::from_path(&results_path).map_err(|e| DetectError::csv(&results_path, e))?;
    for row in &rows {
        writer
            .serialize(row)
            .map_err(|e| DetectError::csv(&results_path, e))?;
    }
    writer
        .flush()
        .map_err(|e| DetectError::io(&results_path, e))?;

    Ok(SweepReport {
        results_path,
        combinations,
        hits,
    })
}

pub fn print_report(report: &SweepReport) {
    println!(
        "Swept {} combinations, results in {}",
        report.combinations,
        report.results_path.display()
    );
    if report.hits.is_empty() {
        println!("No combination produced a vacuum event.");
        return;
    }
    println!("Combinations with vacuum events:");
    for hit in &report.hits {
        println!(
            "  win_size={:<4} ratio={:<4} codet={:<4} -> {} events",
            hit.win_size_sec, hit.power_ratio_threshold, hit.co_detection_window_sec, hit.events
        );
    }
}
