use chrono::{DateTime, Utc};
use log::debug;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::types::{Channel, DetectionParameters, SinusoidDetection};

const POWER_EPSILON: f64 = 1e-12;

/// Window geometry derived from the parameters and the estimated sampling
/// rate, shared by all four channel scans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPlan {
    pub window_size: usize,
    pub half_window: usize,
    pub min_gap_samples: usize,
    pub sampling_rate_hz: f64,
}

impl ScanPlan {
    pub fn from_parameters(params: &DetectionParameters, sampling_rate_hz: f64) -> Self {
        let mut window_size = (params.win_size_sec * sampling_rate_hz).round() as usize;
        if window_size < 3 {
            window_size = 3;
        }
        if window_size % 2 == 0 {
            window_size += 1;
        }
        // The co-detection window doubles as the in-channel re-detection
        // gap; sharing one parameter is intentional.
        let min_gap_samples = params.min_gap_samples.unwrap_or_else(|| {
            (params.co_detection_window_sec * sampling_rate_hz).round() as usize
        });
        ScanPlan {
            window_size,
            half_window: window_size / 2,
            min_gap_samples,
            sampling_rate_hz,
        }
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sampling_rate_hz / self.window_size as f64
    }
}

/// Forward-FFT context for one window size. Built once per plan and passed
/// into every channel scan; nothing is cached behind the caller's back.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window_size: usize,
}

impl SpectrumAnalyzer {
    pub fn new(window_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_size);
        SpectrumAnalyzer { fft, window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Complex spectrum of one segment. The segment length must equal the
    /// analyzer's window size.
    pub fn spectrum(&self, segment: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> =
            segment.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        buffer
    }
}

/// Folds a complex spectrum into one-sided magnitudes of length n/2 + 1.
/// The DC bin is removed outright, interior bins are doubled, the last bin
/// stays unscaled.
pub fn one_sided_magnitudes(spectrum: &[Complex<f64>]) -> Vec<f64> {
    let n = spectrum.len();
    let m = n / 2 + 1;
    let mut one_sided = vec![0.0; m];
    for k in 1..m {
        let mag = spectrum[k].norm() / n as f64;
        one_sided[k] = if k < m - 1 { 2.0 * mag } else { mag };
    }
    one_sided
}

fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best = 0usize;
    let mut best_value = values[0];
    for (k, &v) in values.iter().enumerate().skip(1) {
        if v > best_value {
            best = k;
            best_value = v;
        }
    }
    (best, best_value)
}

/// Slides the analysis window across one channel and collects sinusoid
/// detections. Detections in the same channel never sit closer than the
/// plan's gap.
pub fn scan_channel(
    analyzer: &SpectrumAnalyzer,
    plan: &ScanPlan,
    params: &DetectionParameters,
    channel: Channel,
    signal: &[f64],
    timestamps: &[DateTime<Utc>],
) -> Vec<SinusoidDetection> {
    let n = signal.len();
    let mut detections = Vec::new();
    if n < plan.window_size {
        debug!(
            "{}: {} samples is shorter than one {}-sample window",
            channel, n, plan.window_size
        );
        return detections;
    }

    let mut last_index: Option<usize> = None;
    for i in plan.half_window..=n - plan.half_window - 1 {
        if let Some(last) = last_index {
            if i - last < plan.min_gap_samples {
                continue;
            }
        }

        let segment = &signal[i - plan.half_window..=i + plan.half_window];
        let spectrum = analyzer.spectrum(segment);
        let one_sided = one_sided_magnitudes(&spectrum);

        let (peak_bin, peak_mag) = argmax(&one_sided);
        let total_power: f64 = one_sided.iter().sum::<f64>() + POWER_EPSILON;
        let power_ratio = peak_mag / total_power;

        if power_ratio > params.power_ratio_threshold && peak_mag > params.minimum_amplitude {
            // Phase comes from the raw complex bin, not the folded magnitudes.
            let phase_radians = spectrum[peak_bin].arg();
            detections.push(SinusoidDetection {
                index: i,
                timestamp: timestamps[i],
                channel,
                frequency_hz: plan.bin_frequency(peak_bin),
                phase_radians,
                power_ratio,
            });
            last_index = Some(i);
        }
    }

    debug!("{}: {} detections", channel, detections.len());
    detections
}
