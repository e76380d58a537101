use directories::ProjectDirs;
use knuffel::Decode;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::DetectionParameters;

/// On-disk configuration, KDL format. Every field is optional; anything not
/// set falls back to the built-in defaults. Example:
///
/// ```kdl
/// detection win-size-sec=0.25 power-ratio-threshold=0.75 min-amplitude=5.0
/// output charts=false
/// ```
#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[knuffel(child)]
    pub detection: Option<DetectionConfig>,
    #[knuffel(child)]
    pub output: Option<OutputConfig>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[knuffel(property)]
    pub win_size_sec: Option<f64>,
    #[knuffel(property)]
    pub power_ratio_threshold: Option<f64>,
    #[knuffel(property)]
    pub co_detection_window_sec: Option<f64>,
    #[knuffel(property)]
    pub phase_threshold: Option<f64>,
    #[knuffel(property)]
    pub frequency_tolerance: Option<f64>,
    #[knuffel(property)]
    pub min_amplitude: Option<f64>,
    #[knuffel(property)]
    pub zeroing_samples: Option<u32>,
    #[knuffel(property)]
    pub min_gap_samples: Option<u32>,
}

#[derive(Decode, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[knuffel(property)]
    pub charts: Option<bool>,
    #[knuffel(property)]
    pub reports: Option<bool>,
}

impl ScanConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = knuffel::parse("config.kdl", &content)?;
        Ok(config)
    }

    /// Loads the config from the per-user config directory if one exists
    /// there. A missing file is normal; an unreadable one is reported and
    /// skipped.
    pub fn load_default() -> Self {
        let Some(path) = default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("ignoring config at {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Built-in defaults overlaid with whatever the config sets.
    pub fn detection_parameters(&self) -> DetectionParameters {
        let mut params = DetectionParameters::default();
        if let Some(detection) = &self.detection {
            if let Some(v) = detection.win_size_sec {
                params.win_size_sec = v;
            }
            if let Some(v) = detection.power_ratio_threshold {
                params.power_ratio_threshold = v;
            }
            if let Some(v) = detection.co_detection_window_sec {
                params.co_detection_window_sec = v;
            }
            if let Some(v) = detection.phase_threshold {
                params.phase_difference_threshold = v;
            }
            if let Some(v) = detection.frequency_tolerance {
                params.frequency_tolerance = v;
            }
            if let Some(v) = detection.min_amplitude {
                params.minimum_amplitude = v;
            }
            if let Some(v) = detection.zeroing_samples {
                params.zeroing_samples = v as usize;
            }
            if let Some(v) = detection.min_gap_samples {
                params.min_gap_samples = Some(v as usize);
            }
        }
        params
    }

    pub fn write_charts(&self) -> bool {
        self.output.as_ref().and_then(|o| o.charts).unwrap_or(true)
    }

    pub fn write_reports(&self) -> bool {
        self.output.as_ref().and_then(|o| o.reports).unwrap_or(true)
    }
}

pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "vacuscan", "vacuscan")
        .map(|dirs| dirs.config_dir().join("config.kdl"))
}
