use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use super::spectral::SpectrumAnalyzer;

/// Taper shapes for ad-hoc spectral inspection. The detection scan itself
/// always runs untapered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunction {
    Rectangular,
    Hann,
    Hamming,
}

impl WindowFunction {
    pub fn coefficients(self, size: usize) -> Vec<f64> {
        if size < 2 {
            return vec![1.0; size];
        }
        let span = (size - 1) as f64;
        match self {
            WindowFunction::Rectangular => vec![1.0; size],
            WindowFunction::Hann => (0..size)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / span).cos()))
                .collect(),
            WindowFunction::Hamming => (0..size)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / span).cos())
                .collect(),
        }
    }
}

/// Applies a taper to the segment before the forward transform. The segment
/// length must equal the analyzer's window size.
pub fn windowed_spectrum(
    analyzer: &SpectrumAnalyzer,
    window: WindowFunction,
    segment: &[f64],
) -> Vec<Complex<f64>> {
    let coefficients = window.coefficients(segment.len());
    let tapered: Vec<f64> = segment
        .iter()
        .zip(&coefficients)
        .map(|(&x, &w)| x * w)
        .collect();
    analyzer.spectrum(&tapered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_is_all_ones() {
        assert_eq!(WindowFunction::Rectangular.coefficients(5), vec![1.0; 5]);
    }

    #[test]
    fn test_hann_endpoints_and_symmetry() {
        let w = WindowFunction::Hann.coefficients(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        for i in 0..w.len() {
            assert!((w[i] - w[w.len() - 1 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hamming_endpoints() {
        let w = WindowFunction::Hamming.coefficients(9);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[8] - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(WindowFunction::Hann.coefficients(0), Vec::<f64>::new());
        assert_eq!(WindowFunction::Hann.coefficients(1), vec![1.0]);
    }

    #[test]
    fn test_tapered_spectrum_keeps_the_peak_bin() {
        let n = 25;
        let signal: Vec<f64> = (0..n)
            .map(|i| 100.0 * (2.0 * PI * 4.0 * i as f64 / n as f64).cos())
            .collect();
        let analyzer = SpectrumAnalyzer::new(n);
        let spectrum = windowed_spectrum(&analyzer, WindowFunction::Hann, &signal);

        let mut best = 0;
        for k in 1..n / 2 + 1 {
            if spectrum[k].norm() > spectrum[best].norm() {
                best = k;
            }
        }
        assert_eq!(best, 4);
    }
}
