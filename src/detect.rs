use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart;
use crate::detector::{
    correlate, correct, estimate_sampling_rate, scan_channel, ScanPlan, SpectrumAnalyzer,
};
use crate::error::DetectError;
use crate::report;
use crate::telemetry;
use crate::types::{
    Channel, DetectionParameters, PerChannel, Recording, SinusoidDetection, VacuumEvent,
};

/// Everything one detection run produces, kept together so the report and
/// chart writers can consume it without touching the pipeline again.
pub struct Analysis {
    pub sampling_rate_hz: f64,
    pub plan: ScanPlan,
    pub corrected: PerChannel<Vec<f64>>,
    pub total: Vec<f64>,
    pub detections: PerChannel<Vec<SinusoidDetection>>,
    pub events: Vec<VacuumEvent>,
}

impl Analysis {
    pub fn detection_count(&self) -> usize {
        self.detections.iter().map(|(_, list)| list.len()).sum()
    }
}

/// Runs the full detection pipeline over one in-memory recording:
/// preprocessing, rate estimation, per-channel spectral scan, correlation.
pub fn analyze(
    recording: &Recording,
    params: &DetectionParameters,
) -> Result<Analysis, DetectError> {
    let sampling_rate_hz = estimate_sampling_rate(&recording.timestamps)?;
    let plan = ScanPlan::from_parameters(params, sampling_rate_hz);
    info!(
        "sampling rate {:.3} Hz, window {} samples, in-channel gap {} samples",
        sampling_rate_hz, plan.window_size, plan.min_gap_samples
    );

    let corrected = recording
        .channels
        .map(|_, signal| correct(signal, params.zeroing_samples));

    let analyzer = SpectrumAnalyzer::new(plan.window_size);
    let detections = corrected.map(|channel, signal| {
        scan_channel(
            &analyzer,
            &plan,
            params,
            channel,
            signal,
            &recording.timestamps,
        )
    });
    let events = correlate(&detections, params);

    let total: Vec<f64> = (0..recording.len())
        .map(|i| Channel::ALL.iter().map(|&c| corrected[c][i]).sum::<f64>())
        .collect();

    Ok(Analysis {
        sampling_rate_hz,
        plan,
        corrected,
        total,
        detections,
        events,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub write_report: bool,
    pub write_chart: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            write_report: true,
            write_chart: true,
        }
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub detection_count: usize,
    pub event_count: usize,
    pub report_path: Option<PathBuf>,
    pub chart_path: Option<PathBuf>,
}

/// Reads one telemetry file, analyzes it, and drops the report and chart
/// into a sibling directory named after the file stem.
pub fn run_file(
    path: &Path,
    params: &DetectionParameters,
    outputs: &OutputOptions,
) -> Result<FileOutcome, DetectError> {
    let recording = telemetry::read_recording(path)?;
    let analysis = analyze(&recording, params)?;
    info!(
        "{}: {} sinusoid detections, {} vacuum events",
        path.display(),
        analysis.detection_count(),
        analysis.events.len()
    );

    let mut report_path = None;
    let mut chart_path = None;
    if outputs.write_report || outputs.write_chart {
        let out_dir = path.with_extension("");
        fs::create_dir_all(&out_dir).map_err(|e| DetectError::io(&out_dir, e))?;
        let tag = params.file_tag();

        if outputs.write_report {
            let target = out_dir.join(format!("{}_detections.csv", tag));
            report::write_report(&target, &analysis.detections, &analysis.events)?;
            info!("wrote report {}", target.display());
            report_path = Some(target);
        }
        if outputs.write_chart {
            let target = out_dir.join(format!("{}_graph.png", tag));
            chart::render(&target, &recording, &analysis)?;
            info!("wrote chart {}", target.display());
            chart_path = Some(target);
        }
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        detection_count: analysis.detection_count(),
        event_count: analysis.events.len(),
        report_path,
        chart_path,
    })
}
