/// Find every sign change between consecutive samples
///
/// Returns the ascending indices `i` for which `samples[i - 1] * samples[i]`
/// is strictly negative. Both polarities count (rising and falling).
///
/// A sample that is exactly zero never forms a crossing with either
/// neighbour: `[1.0, 0.0, -1.0]` has no crossings at all. Buffers that
/// touch zero at the transition therefore report nothing for that
/// transition.
///
/// # Arguments
/// * `samples` - Scaled samples of one channel
pub fn find_crossings(samples: &[f64]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            if pair[0] * pair[1] < 0.0 {
                Some(i + 1)
            } else {
                None
            }
        })
        .collect()
}

/// First crossing index, if the buffer has any
pub fn first_crossing(samples: &[f64]) -> Option<usize> {
    samples
        .windows(2)
        .position(|pair| pair[0] * pair[1] < 0.0)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_signal() {
        let signal = vec![10.0, -10.0, 10.0, -10.0];
        assert_eq!(find_crossings(&signal), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_sample_is_not_a_crossing() {
        let signal = vec![1.0, 0.0, -1.0, 0.0, 1.0];
        assert!(find_crossings(&signal).is_empty());
        assert_eq!(first_crossing(&signal), None);
    }

    #[test]
    fn test_sine_crossings() {
        // 0.05 rad/sample over 400 samples = 20 rad, sin changes sign every pi rad
        let signal: Vec<f64> = (1..=400).map(|i| (i as f64 * 0.05).sin()).collect();

        let crossings = find_crossings(&signal);

        assert_eq!(crossings.len(), 6);
        assert!(crossings.windows(2).all(|w| w[0] < w[1]));
        // First sign change right after pi
        assert_eq!(crossings[0], 62);
    }

    #[test]
    fn test_empty_and_single_sample() {
        assert!(find_crossings(&[]).is_empty());
        assert!(find_crossings(&[3.0]).is_empty());
        assert_eq!(first_crossing(&[]), None);
    }

    #[test]
    fn test_first_crossing_matches_list_head() {
        let signal = vec![2.0, 1.0, -0.5, -1.0, 4.0];
        let crossings = find_crossings(&signal);
        assert_eq!(crossings, vec![2, 4]);
        assert_eq!(first_crossing(&signal), Some(2));
    }
}
