use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Channel {
    W1,
    W2,
    W3,
    W4,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::W1, Channel::W2, Channel::W3, Channel::W4];

    /// The two sensor pairs expected to oscillate in anti-phase during a
    /// vacuum event.
    pub const PAIRS: [(Channel, Channel); 2] =
        [(Channel::W1, Channel::W4), (Channel::W2, Channel::W3)];

    pub fn index(self) -> usize {
        match self {
            Channel::W1 => 0,
            Channel::W2 => 1,
            Channel::W3 => 2,
            Channel::W4 => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Channel> {
        Channel::ALL.get(index).copied()
    }

    /// One-based sensor number as it appears in column names and reports.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    pub fn column_name(self) -> &'static str {
        match self {
            Channel::W1 => "weight_1",
            Channel::W2 => "weight_2",
            Channel::W3 => "weight_3",
            Channel::W4 => "weight_4",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Fixed four-slot container indexed by `Channel`. Keeps per-channel data
/// together without exposing unchecked integer indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerChannel<T> {
    slots: [T; 4],
}

impl<T> PerChannel<T> {
    pub fn new(slots: [T; 4]) -> Self {
        Self { slots }
    }

    pub fn from_fn<F: FnMut(Channel) -> T>(mut f: F) -> Self {
        Self {
            slots: std::array::from_fn(|i| f(Channel::ALL[i])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn map<U, F: FnMut(Channel, &T) -> U>(&self, mut f: F) -> PerChannel<U> {
        PerChannel {
            slots: std::array::from_fn(|i| f(Channel::ALL[i], &self.slots[i])),
        }
    }
}

impl<T> Index<Channel> for PerChannel<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        &self.slots[channel.index()]
    }
}

impl<T> IndexMut<Channel> for PerChannel<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.slots[channel.index()]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionParameters {
    pub win_size_sec: f64,
    pub power_ratio_threshold: f64,
    pub co_detection_window_sec: f64,
    pub phase_difference_threshold: f64,
    pub frequency_tolerance: f64,
    pub minimum_amplitude: f64,
    pub zeroing_samples: usize,
    /// In-channel re-detection gap in samples. `None` derives it from
    /// `co_detection_window_sec` and the estimated sampling rate.
    pub min_gap_samples: Option<usize>,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            win_size_sec: 0.5,
            power_ratio_threshold: 0.5,
            co_detection_window_sec: 0.5,
            phase_difference_threshold: std::f64::consts::PI / 1.1,
            frequency_tolerance: 0.1,
            minimum_amplitude: 10.0,
            zeroing_samples: 20,
            min_gap_samples: None,
        }
    }
}

impl DetectionParameters {
    /// Sanitized parameter string embedded in output file names:
    /// dots and spaces removed, '=' collapsed to '_'.
    pub fn file_tag(&self) -> String {
        let raw = format!(
            "win_size_sec={:.2}_thr={:.2}_codet={:.2}",
            self.win_size_sec, self.power_ratio_threshold, self.co_detection_window_sec
        );
        raw.chars()
            .filter_map(|c| match c {
                '.' | ' ' => None,
                '=' => Some('_'),
                other => Some(other),
            })
            .collect()
    }
}

/// One candidate sinusoid found by the per-channel sliding-window scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SinusoidDetection {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub channel: Channel,
    pub frequency_hz: f64,
    pub phase_radians: f64,
    pub power_ratio: f64,
}

/// A moment where both fixed pairs oscillate at a shared frequency in
/// anti-phase. `detections` holds the four contributing matches in
/// channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct VacuumEvent {
    pub timestamp: DateTime<Utc>,
    pub pairs: [(Channel, Channel); 2],
    pub detections: [SinusoidDetection; 4],
}

/// One telemetry file materialized in memory: aligned timestamps and the
/// four raw channel signals, equal lengths by construction.
#[derive(Debug, Clone)]
pub struct Recording {
    pub timestamps: Vec<DateTime<Utc>>,
    pub channels: PerChannel<Vec<f64>>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_pairs_cover_all_channels_once() {
        let mut seen = [false; 4];
        for (a, b) in Channel::PAIRS {
            seen[a.index()] = true;
            seen[b.index()] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn test_channel_index_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_index(channel.index()), Some(channel));
        }
        assert_eq!(Channel::from_index(4), None);
    }

    #[test]
    fn test_per_channel_indexing() {
        let mut per = PerChannel::new([0usize, 1, 2, 3]);
        assert_eq!(per[Channel::W3], 2);
        per[Channel::W3] = 9;
        assert_eq!(per[Channel::W3], 9);
        let doubled = per.map(|_, v| v * 2);
        assert_eq!(doubled[Channel::W3], 18);
    }

    #[test]
    fn test_default_parameters() {
        let params = DetectionParameters::default();
        assert_eq!(params.win_size_sec, 0.5);
        assert_eq!(params.power_ratio_threshold, 0.5);
        assert_eq!(params.co_detection_window_sec, 0.5);
        assert!((params.phase_difference_threshold - std::f64::consts::PI / 1.1).abs() < 1e-12);
        assert_eq!(params.frequency_tolerance, 0.1);
        assert_eq!(params.minimum_amplitude, 10.0);
        assert_eq!(params.zeroing_samples, 20);
        assert_eq!(params.min_gap_samples, None);
    }

    #[test]
    fn test_file_tag_sanitization() {
        let tag = DetectionParameters::default().file_tag();
        assert_eq!(tag, "win_size_sec_050_thr_050_codet_050");
    }
}
