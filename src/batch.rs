use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::detect::{self, FileOutcome, OutputOptions};
use crate::error::{DetectError, ErrorKind};
use crate::types::DetectionParameters;

/// Outcomes of one batch run. Lives only for the run that produced it.
#[derive(Debug)]
pub struct BatchSummary {
    pub total_files: usize,
    pub succeeded: usize,
    pub files_with_events: usize,
    pub total_detections: usize,
    pub total_events: usize,
    pub failures: Vec<(PathBuf, DetectError)>,
    pub elapsed: Duration,
}

impl BatchSummary {
    fn new(total_files: usize) -> Self {
        BatchSummary {
            total_files,
            succeeded: 0,
            files_with_events: 0,
            total_detections: 0,
            total_events: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    fn record_success(&mut self, outcome: &FileOutcome) {
        self.succeeded += 1;
        self.total_detections += outcome.detection_count;
        self.total_events += outcome.event_count;
        if outcome.event_count > 0 {
            self.files_with_events += 1;
        }
    }

    fn record_failure(&mut self, path: &Path, error: DetectError) {
        self.failures.push((path.to_path_buf(), error));
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn failures_of_kind(&self, kind: ErrorKind) -> usize {
        self.failures
            .iter()
            .filter(|(_, error)| error.kind() == kind)
            .count()
    }
}

/// Telemetry files in the folder, sorted for a stable processing order.
pub fn discover_files(folder: &Path) -> Result<Vec<PathBuf>, DetectError> {
    let entries = std::fs::read_dir(folder).map_err(|e| DetectError::io(folder, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DetectError::io(folder, e))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Processes every telemetry file in the folder in sequence. One file's
/// failure is recorded and the rest keep going.
pub fn run_folder(
    folder: &Path,
    params: &DetectionParameters,
    outputs: &OutputOptions,
) -> Result<BatchSummary, DetectError> {
    let files = discover_files(folder)?;
    if files.is_empty() {
        return Err(DetectError::NoInputFiles {
            path: folder.to_path_buf(),
        });
    }

    info!("processing {} files from {}", files.len(), folder.display());
    let started = Instant::now();
    let mut summary = BatchSummary::new(files.len());

    for file in &files {
        match detect::run_file(file, params, outputs) {
            Ok(outcome) => {
                println!(
                    "{}: {} sinusoid detections, {} vacuum events",
                    file.display(),
                    outcome.detection_count,
                    outcome.event_count
                );
                summary.record_success(&outcome);
            }
            Err(err) => {
                error!("{}: {}", file.display(), err);
                summary.record_failure(file, err);
            }
        }
    }

    summary.elapsed = started.elapsed();
    Ok(summary)
}

pub fn print_summary(summary: &BatchSummary) {
    println!();
    println!(
        "Processed {} files in {:.1}s",
        summary.total_files,
        summary.elapsed.as_secs_f64()
    );
    println!(
        "  succeeded: {} ({} with vacuum events)",
        summary.succeeded, summary.files_with_events
    );
    println!(
        "  failed: {} (input: {}, computation: {}, collaborator: {})",
        summary.failed(),
        summary.failures_of_kind(ErrorKind::Input),
        summary.failures_of_kind(ErrorKind::Computation),
        summary.failures_of_kind(ErrorKind::Collaborator)
    );
    println!(
        "  sinusoid detections: {}, vacuum events: {}",
        summary.total_detections, summary.total_events
    );
    if !summary.failures.is_empty() {
        println!("Failures:");
        for (path, error) in &summary.failures {
            println!("  {} [{}]: {}", path.display(), error.kind(), error);
        }
    }
}
