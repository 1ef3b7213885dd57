/// Mean of the squared samples
///
/// Returns NaN for an empty buffer; callers check finiteness.
pub fn mean_square(samples: &[f64]) -> f64 {
    samples.iter().map(|&x| x * x).sum::<f64>() / samples.len() as f64
}

/// Root-mean-square value over the whole buffer
pub fn rms(samples: &[f64]) -> f64 {
    mean_square(samples).sqrt()
}

/// Time-domain mean of the sample-by-sample product
///
/// Pairs beyond the shorter buffer are ignored; the mean is taken over
/// `a.len()` so mismatched lengths must be rejected before calling.
pub fn mean_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum::<f64>() / a.len() as f64
}

/// Convert an index offset inside one acquisition window to degrees
///
/// The window is assumed to span exactly one mains cycle, so an offset of
/// the full window length is 360 degrees. The sample interval cancels,
/// so only indices enter. The result is not wrapped.
pub fn index_delta_to_degrees(delta: i64, window_len: usize) -> f64 {
    delta as f64 / window_len as f64 * 360.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rms_of_square_wave() {
        assert_relative_eq!(rms(&[3.0, -3.0, 3.0, -3.0]), 3.0);
    }

    #[test]
    fn test_rms_of_sine() {
        let n = 2000;
        let signal: Vec<f64> = (0..n)
            .map(|i| 325.0 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).sin())
            .collect();
        assert_relative_eq!(rms(&signal), 325.0 / 2f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_mean_square_empty_is_nan() {
        assert!(mean_square(&[]).is_nan());
    }

    #[test]
    fn test_mean_product() {
        // (4 + 10 - 18) / 3
        assert_relative_eq!(mean_product(&[1.0, 2.0, -3.0], &[4.0, 5.0, 6.0]), -4.0 / 3.0);
        assert_relative_eq!(mean_product(&[1.0, 2.0, -1.0], &[4.0, 5.0, 14.0]), 0.0);
        assert_relative_eq!(mean_product(&[10.0, -10.0], &[5.0, -5.0]), 50.0);
    }

    #[test]
    fn test_index_delta_to_degrees() {
        assert_relative_eq!(index_delta_to_degrees(500, 2000), 90.0);
        assert_relative_eq!(index_delta_to_degrees(-1000, 2000), -180.0);
        assert_relative_eq!(index_delta_to_degrees(0, 2000), 0.0);
    }
}
