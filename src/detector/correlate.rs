use log::{debug, info};

use crate::types::{Channel, DetectionParameters, PerChannel, SinusoidDetection, VacuumEvent};
use crate::util::{is_anti_phase, seconds_between};

/// Accepted events closer than this to the previous one are duplicates of
/// the same physical disturbance. Fixed, not configurable.
pub const DEDUP_EPSILON_SECS: f64 = 0.1;

/// Merges the per-channel detections and promotes moments where both fixed
/// pairs oscillate at one frequency in anti-phase into vacuum events.
pub fn correlate(
    detections: &PerChannel<Vec<SinusoidDetection>>,
    params: &DetectionParameters,
) -> Vec<VacuumEvent> {
    let mut merged: Vec<&SinusoidDetection> = detections
        .iter()
        .flat_map(|(_, list)| list.iter())
        .collect();
    // Stable sort: equal timestamps keep channel order, then scan order.
    merged.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let half_window = params.co_detection_window_sec / 2.0;
    let mut events: Vec<VacuumEvent> = Vec::new();

    for &reference in &merged {
        // First match per channel wins, in merge order, not the closest.
        let mut table: [Option<&SinusoidDetection>; 4] = [None; 4];
        for &candidate in &merged {
            if seconds_between(candidate.timestamp, reference.timestamp).abs() <= half_window {
                let slot = &mut table[candidate.channel.index()];
                if slot.is_none() {
                    *slot = Some(candidate);
                }
            }
        }

        let pairs_hold = Channel::PAIRS
            .iter()
            .all(|&(a, b)| match (table[a.index()], table[b.index()]) {
                (Some(x), Some(y)) => pair_matches(x, y, params),
                _ => false,
            });
        if !pairs_hold {
            continue;
        }
        let [Some(w1), Some(w2), Some(w3), Some(w4)] = table else {
            continue;
        };

        if let Some(last) = events.last() {
            if seconds_between(reference.timestamp, last.timestamp).abs() <= DEDUP_EPSILON_SECS {
                debug!(
                    "suppressed duplicate candidate at {} near {}",
                    reference.timestamp, last.timestamp
                );
                continue;
            }
        }

        info!(
            "vacuum event at {} ({:.3} Hz)",
            reference.timestamp, w1.frequency_hz
        );
        events.push(VacuumEvent {
            timestamp: reference.timestamp,
            pairs: Channel::PAIRS,
            detections: [w1.clone(), w2.clone(), w3.clone(), w4.clone()],
        });
    }

    events
}

fn pair_matches(
    a: &SinusoidDetection,
    b: &SinusoidDetection,
    params: &DetectionParameters,
) -> bool {
    (a.frequency_hz - b.frequency_hz).abs() < params.frequency_tolerance
        && is_anti_phase(a.phase_radians, b.phase_radians, params.phase_difference_threshold)
}
