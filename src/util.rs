use chrono::{DateTime, Utc};
use std::f64::consts::PI;
use std::str::FromStr;

pub fn positive_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
        .and_then(|v| {
            if v > 0.0 && v.is_finite() {
                Ok(v)
            } else {
                Err(format!("Value must be positive, got {}", v))
            }
        })
}

pub fn ratio_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid ratio '{}': {}", s, e))
        .and_then(|v| {
            if v > 0.0 && v <= 1.0 {
                Ok(v)
            } else {
                Err(format!("Ratio must be in (0, 1], got {}", v))
            }
        })
}

pub fn amplitude_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid amplitude '{}': {}", s, e))
        .and_then(|v| {
            if v >= 0.0 && v.is_finite() {
                Ok(v)
            } else {
                Err(format!("Amplitude must be non-negative, got {}", v))
            }
        })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Wraps an angle onto [-pi, pi].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Circular difference a - b, wrapped onto [-pi, pi].
pub fn angle_difference(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}

/// True when two phase angles sit close to half a cycle apart.
pub fn is_anti_phase(a: f64, b: f64, tolerance: f64) -> bool {
    (angle_difference(a, b).abs() - PI).abs() < tolerance
}

pub fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let delta = later.signed_duration_since(earlier);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_positive_parser() {
        assert_eq!(positive_parser("0.5"), Ok(0.5));
        assert_eq!(positive_parser(" 2 "), Ok(2.0));
        assert!(positive_parser("0").is_err());
        assert!(positive_parser("-1").is_err());
        assert!(positive_parser("abc").is_err());
    }

    #[test]
    fn test_ratio_parser() {
        assert_eq!(ratio_parser("0.5"), Ok(0.5));
        assert_eq!(ratio_parser("1"), Ok(1.0));
        assert!(ratio_parser("0").is_err());
        assert!(ratio_parser("1.5").is_err());
    }

    #[test]
    fn test_amplitude_parser() {
        assert_eq!(amplitude_parser("10"), Ok(10.0));
        assert_eq!(amplitude_parser("0"), Ok(0.0));
        assert!(amplitude_parser("-3").is_err());
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_median_ignores_outliers() {
        assert_eq!(median(&[0.008, 0.008, 0.008, 5.0, 0.008]), 0.008);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-3.0 * PI) + PI).abs() < 1e-12);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert!((angle_difference(3.0, -3.0) - (6.0 - 2.0 * PI)).abs() < 1e-12);
        assert!((angle_difference(0.1, 0.3) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_is_anti_phase() {
        assert!(is_anti_phase(PI / 2.0, -PI / 2.0, 0.1));
        assert!(is_anti_phase(3.0, 3.0 - PI, 0.1));
        assert!(!is_anti_phase(0.1, 0.2, 0.1));
        // Angles near +pi and -pi are the same direction, not opposite.
        assert!(!is_anti_phase(PI - 0.05, -PI + 0.05, 0.5));
    }

    #[test]
    fn test_seconds_between() {
        let a = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(250);
        assert!((seconds_between(b, a) - 0.25).abs() < 1e-9);
        assert!((seconds_between(a, b) + 0.25).abs() < 1e-9);
    }
}
