use crate::util::mean;

pub const NEIGHBOR_THRESHOLD: f64 = 10.0;
pub const SPIKE_THRESHOLD: f64 = 200.0;

/// Zero-references a channel against its initial samples and suppresses
/// isolated spikes with the contract thresholds.
pub fn correct(signal: &[f64], zeroing_samples: usize) -> Vec<f64> {
    correct_with(signal, zeroing_samples, NEIGHBOR_THRESHOLD, SPIKE_THRESHOLD)
}

pub fn correct_with(
    signal: &[f64],
    zeroing_samples: usize,
    neighbor_threshold: f64,
    spike_threshold: f64,
) -> Vec<f64> {
    let mut corrected = signal.to_vec();

    let span = zeroing_samples.min(signal.len());
    if span > 0 {
        let zero = mean(&signal[..span]);
        for value in &mut corrected {
            *value -= zero;
        }
    }

    if corrected.len() < 3 {
        return corrected;
    }

    // Single pass. Neighbor tests read the zero-referenced values, not
    // earlier replacements, so adjacent spikes stay as they are instead of
    // being smoothed into each other.
    let base = corrected.clone();
    for i in 1..base.len() - 1 {
        let prev = base[i - 1];
        let next = base[i + 1];
        let center = base[i];
        let midpoint = (prev + next) / 2.0;
        if (prev - next).abs() < neighbor_threshold && (center - midpoint).abs() > spike_threshold {
            corrected[i] = midpoint;
        }
    }

    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_reference_uses_initial_samples() {
        let signal = vec![10.0, 12.0, 14.0, 100.0, 100.0];
        let corrected = correct_with(&signal, 3, 10.0, 200.0);
        // Baseline is mean(10, 12, 14) = 12.
        assert_eq!(corrected[0], -2.0);
        assert_eq!(corrected[1], 0.0);
        assert_eq!(corrected[2], 2.0);
        assert_eq!(corrected[3], 88.0);
    }

    #[test]
    fn test_zeroing_span_clamps_to_signal_length() {
        let signal = vec![4.0, 6.0];
        let corrected = correct_with(&signal, 20, 10.0, 200.0);
        assert_eq!(corrected, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_isolated_spike_replaced_by_neighbor_midpoint() {
        let signal = vec![0.0, 2.0, 300.0, 4.0, 0.0];
        let corrected = correct_with(&signal, 0, 10.0, 200.0);
        assert_eq!(corrected[2], 3.0);
        assert_eq!(corrected[1], 2.0);
        assert_eq!(corrected[3], 4.0);
    }

    #[test]
    fn test_small_bump_kept_when_below_spike_threshold() {
        let signal = vec![0.0, 2.0, 150.0, 4.0, 0.0];
        let corrected = correct_with(&signal, 0, 10.0, 200.0);
        assert_eq!(corrected[2], 150.0);
    }

    #[test]
    fn test_spike_kept_when_neighbors_disagree() {
        let signal = vec![0.0, 0.0, 300.0, 50.0, 0.0];
        let corrected = correct_with(&signal, 0, 10.0, 200.0);
        assert_eq!(corrected[2], 300.0);
    }

    #[test]
    fn test_adjacent_spikes_not_mutually_smoothed() {
        let signal = vec![0.0, 300.0, 300.0, 0.0, 0.0];
        let corrected = correct_with(&signal, 0, 10.0, 200.0);
        assert_eq!(corrected, signal);
    }

    #[test]
    fn test_single_pass_is_idempotent_on_clean_output() {
        let signal = vec![0.0, 2.0, 300.0, 4.0, 0.0, 1.0];
        let once = correct_with(&signal, 0, 10.0, 200.0);
        let twice = correct_with(&once, 0, 10.0, 200.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_short_signals_skip_spike_pass() {
        assert_eq!(correct_with(&[5.0, 7.0], 0, 10.0, 200.0), vec![5.0, 7.0]);
        assert_eq!(correct_with(&[], 0, 10.0, 200.0), Vec::<f64>::new());
    }
}
