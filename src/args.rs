use crate::types::DetectionParameters;
use crate::util::{amplitude_parser, positive_parser, ratio_parser};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vacuum event detection in weight sensor telemetry.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Telemetry CSV to analyze.
    #[arg(long, conflicts_with = "folder")]
    pub file: Option<PathBuf>,
    /// Folder of telemetry CSVs to analyze in sequence.
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// FFT window length in seconds.
    #[arg(long, value_parser = positive_parser)]
    pub win_size: Option<f64>,
    /// Fraction of spectral power the peak bin must carry, in (0, 1].
    #[arg(long, value_parser = ratio_parser)]
    pub power_ratio: Option<f64>,
    /// Cross-channel co-detection window in seconds.
    #[arg(long, value_parser = positive_parser)]
    pub co_detection: Option<f64>,
    /// Allowed deviation from exact anti-phase, in radians.
    #[arg(long, value_parser = positive_parser)]
    pub phase_threshold: Option<f64>,
    /// Allowed peak frequency mismatch between paired channels, in Hz.
    #[arg(long, value_parser = positive_parser)]
    pub frequency_tolerance: Option<f64>,
    /// Smallest one-sided peak magnitude that counts as a detection.
    #[arg(long, value_parser = amplitude_parser)]
    pub min_amplitude: Option<f64>,
    /// Number of leading samples averaged into the zero reference.
    #[arg(long)]
    pub zeroing_samples: Option<usize>,
    /// Fixed re-detection gap in samples, replacing the derived one.
    #[arg(long)]
    pub min_gap: Option<usize>,

    /// Config file to use instead of the per-user one.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Skip writing the overlay chart.
    #[arg(long)]
    pub no_chart: bool,
    /// Skip writing the CSV report.
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the detection parameter grid over one file and tabulate the outcomes.
    Sweep {
        /// Telemetry CSV to sweep; falls back to --file or the first file in --folder.
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Command-line values win over the config file and the defaults.
    pub fn apply_overrides(&self, params: &mut DetectionParameters) {
        if let Some(v) = self.win_size {
            params.win_size_sec = v;
        }
        if let Some(v) = self.power_ratio {
            params.power_ratio_threshold = v;
        }
        if let Some(v) = self.co_detection {
            params.co_detection_window_sec = v;
        }
        if let Some(v) = self.phase_threshold {
            params.phase_difference_threshold = v;
        }
        if let Some(v) = self.frequency_tolerance {
            params.frequency_tolerance = v;
        }
        if let Some(v) = self.min_amplitude {
            params.minimum_amplitude = v;
        }
        if let Some(v) = self.zeroing_samples {
            params.zeroing_samples = v;
        }
        if let Some(v) = self.min_gap {
            params.min_gap_samples = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_touch_only_given_flags() {
        let cli = Cli::try_parse_from(["vacuscan", "--win-size", "0.25", "--min-gap", "40"])
            .unwrap();
        let mut params = DetectionParameters::default();
        let defaults = DetectionParameters::default();
        cli.apply_overrides(&mut params);
        assert_eq!(params.win_size_sec, 0.25);
        assert_eq!(params.min_gap_samples, Some(40));
        assert_eq!(params.power_ratio_threshold, defaults.power_ratio_threshold);
        assert_eq!(params.zeroing_samples, defaults.zeroing_samples);
    }

    #[test]
    fn test_file_and_folder_conflict() {
        let result = Cli::try_parse_from(["vacuscan", "--file", "a.csv", "--folder", "runs"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_takes_optional_file() {
        let cli = Cli::try_parse_from(["vacuscan", "sweep", "runs/day1.csv"]).unwrap();
        match cli.command {
            Some(Commands::Sweep { file }) => {
                assert_eq!(file, Some(PathBuf::from("runs/day1.csv")));
            }
            _ => panic!("expected sweep subcommand"),
        }
    }
}
