use chrono::{DateTime, Utc};
use log::debug;

use crate::error::DetectError;
use crate::util::{median, seconds_between};

/// Estimates a uniform sampling rate from timestamps. The median interval
/// shrugs off occasional gaps and duplicate rows that would skew a mean.
pub fn estimate_sampling_rate(timestamps: &[DateTime<Utc>]) -> Result<f64, DetectError> {
    if timestamps.len() < 2 {
        return Err(DetectError::TooFewTimestamps {
            count: timestamps.len(),
        });
    }

    let deltas: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| seconds_between(pair[1], pair[0]))
        .collect();
    let median_delta = median(&deltas);
    let rate = 1.0 / median_delta;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(DetectError::DegenerateSamplingRate {
            rate,
            median_delta_secs: median_delta,
        });
    }

    debug!("median interval {:.6} s, sampling rate {:.3} Hz", median_delta, rate);
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::{Duration, TimeZone};

    fn stamps(intervals_ms: &[i64]) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut out = vec![start];
        let mut cursor = start;
        for &ms in intervals_ms {
            cursor += Duration::milliseconds(ms);
            out.push(cursor);
        }
        out
    }

    #[test]
    fn test_uniform_intervals() {
        let rate = estimate_sampling_rate(&stamps(&[8, 8, 8, 8])).unwrap();
        assert!((rate - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_median_survives_a_long_gap() {
        let rate = estimate_sampling_rate(&stamps(&[8, 8, 5000, 8, 8])).unwrap();
        assert!((rate - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_two_timestamps_is_input_error() {
        let err = estimate_sampling_rate(&stamps(&[])[..1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        let err = estimate_sampling_rate(&[]).unwrap_err();
        assert!(matches!(err, DetectError::TooFewTimestamps { count: 0 }));
    }

    #[test]
    fn test_all_duplicate_timestamps_is_computation_error() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let err = estimate_sampling_rate(&[start, start, start]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert!(matches!(err, DetectError::DegenerateSamplingRate { .. }));
    }

    #[test]
    fn test_even_delta_count_averages_middle_pair() {
        // Deltas 8ms and 12ms -> median 10ms -> 100 Hz.
        let rate = estimate_sampling_rate(&stamps(&[8, 12])).unwrap();
        assert!((rate - 100.0).abs() < 1e-9);
    }
}
