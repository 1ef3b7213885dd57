use serde::Serialize;

use crate::config::CalibrationConfig;
use crate::error::{MonitorError, Result};
use crate::power::PowerFactorCorrection;
use crate::signal_processing::{first_crossing, index_delta_to_degrees, mean_product, rms};

/// Power-quality figures for one acquisition window
///
/// Every field is non-negative except `phase_difference_deg`, which is a
/// signed offset in (-360, 360). `power_factor` lies in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PowerEstimate {
    pub vrms: f64,
    pub irms: f64,
    pub real_power: f64,
    pub apparent_power: f64,
    pub power_factor: f64,
    pub phase_difference_deg: f64,
}

impl PowerEstimate {
    /// All-zero estimate reported when a cycle cannot be evaluated
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// Phase offset in degrees between the first current and first voltage crossing
///
/// The window is taken to span one mains cycle, so the sample interval
/// cancels and only the index delta and the buffer length matter.
/// Positive when the current crosses later than the voltage. Returns 0
/// when either channel has no crossing, since nothing can be said about
/// the phase then. Only the first crossing of each channel is used and
/// the result is not wrapped.
pub fn phase_difference(voltage: &[f64], current: &[f64]) -> Result<f64> {
    check_lengths(voltage, current)?;

    let (Some(v_first), Some(i_first)) = (first_crossing(voltage), first_crossing(current)) else {
        return Ok(0.0);
    };

    let delta = i_first as i64 - v_first as i64;
    finite("phase difference", index_delta_to_degrees(delta, voltage.len()))
}

/// RMS, power and power factor of one window of scaled samples
///
/// Power factor is `1 - real / apparent`, clamped to [0, 1], and 0 when
/// the apparent power is not positive. `apparent_power_offset` is added to
/// `vrms * irms` before flooring at zero.
///
/// Fails with [`MonitorError::InsufficientData`] on empty or mismatched
/// buffers and with [`MonitorError::Arithmetic`] when an intermediate is
/// not finite.
pub fn estimate_power(
    voltage: &[f64],
    current: &[f64],
    apparent_power_offset: f64,
) -> Result<PowerEstimate> {
    check_lengths(voltage, current)?;
    if voltage.is_empty() {
        return Err(MonitorError::InsufficientData {
            needed: 1,
            available: 0,
        });
    }

    let vrms = finite("vrms", rms(voltage))?;
    let irms = finite("irms", rms(current))?;
    let phase_difference_deg = phase_difference(voltage, current)?;

    let real_power = finite("real power", mean_product(voltage, current))?.max(0.0);
    let apparent_power = finite("apparent power", vrms * irms + apparent_power_offset)?.max(0.0);

    let power_factor = if apparent_power > 0.0 {
        finite("power factor", 1.0 - real_power / apparent_power)?.clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(PowerEstimate {
        vrms,
        irms,
        real_power,
        apparent_power,
        power_factor,
        phase_difference_deg,
    })
}

/// Estimation with a fixed calibration and optional power factor hook
#[derive(Debug, Clone)]
pub struct PowerEstimator {
    apparent_power_offset: f64,
    correction: PowerFactorCorrection,
}

impl PowerEstimator {
    pub fn new(calibration: &CalibrationConfig) -> Self {
        Self {
            apparent_power_offset: calibration.apparent_power_offset,
            correction: calibration.power_factor_correction,
        }
    }

    pub fn estimate(&self, voltage: &[f64], current: &[f64]) -> Result<PowerEstimate> {
        let estimate = estimate_power(voltage, current, self.apparent_power_offset)?;
        Ok(self.correction.apply(estimate))
    }

    /// Like [`estimate`](Self::estimate) but degrades to all zeros on failure
    pub fn estimate_or_zero(&self, voltage: &[f64], current: &[f64]) -> PowerEstimate {
        self.estimate(voltage, current).unwrap_or_else(|e| {
            log::error!("Power estimation failed: {}", e);
            PowerEstimate::zeroed()
        })
    }
}

fn check_lengths(voltage: &[f64], current: &[f64]) -> Result<()> {
    if voltage.len() != current.len() {
        return Err(MonitorError::InsufficientData {
            needed: voltage.len(),
            available: current.len(),
        });
    }
    Ok(())
}

fn finite(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MonitorError::Arithmetic(format!("{} is {}", what, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn sine(n: usize, amplitude: f64, phase_rad: f64) -> Vec<f64> {
        (0..n)
            .map(|k| amplitude * (2.0 * PI * k as f64 / n as f64 + phase_rad).sin())
            .collect()
    }

    #[test]
    fn test_all_zero_buffers() {
        let zeros = vec![0.0; 2000];
        let estimate = estimate_power(&zeros, &zeros, 0.0).unwrap();

        assert_eq!(estimate.vrms, 0.0);
        assert_eq!(estimate.irms, 0.0);
        assert_eq!(estimate.real_power, 0.0);
        assert_eq!(estimate.apparent_power, 0.0);
        assert_eq!(estimate.power_factor, 0.0);
        assert_eq!(estimate.phase_difference_deg, 0.0);
    }

    #[test]
    fn test_zero_signal_with_offset() {
        let zeros = vec![0.0; 2000];
        let estimate = estimate_power(&zeros, &zeros, 230.0).unwrap();

        assert_eq!(estimate.apparent_power, 230.0);
        assert_eq!(estimate.real_power, 0.0);
        assert_eq!(estimate.power_factor, 1.0);
    }

    #[test]
    fn test_square_waves_in_phase() {
        let v = vec![10.0, -10.0, 10.0, -10.0];
        let i = vec![5.0, -5.0, 5.0, -5.0];
        let estimate = estimate_power(&v, &i, 0.0).unwrap();

        assert_relative_eq!(estimate.vrms, 10.0);
        assert_relative_eq!(estimate.irms, 5.0);
        assert_relative_eq!(estimate.real_power, 50.0);
        assert_relative_eq!(estimate.apparent_power, 50.0);
        assert_abs_diff_eq!(estimate.power_factor, 0.0);
        assert_eq!(estimate.phase_difference_deg, 0.0);
    }

    #[test]
    fn test_real_power_floored_at_zero() {
        let v = vec![10.0, -10.0, 10.0, -10.0];
        let i = vec![-5.0, 5.0, -5.0, 5.0];
        let estimate = estimate_power(&v, &i, 0.0).unwrap();

        assert_eq!(estimate.real_power, 0.0);
        assert_relative_eq!(estimate.power_factor, 1.0);
    }

    #[test]
    fn test_quadrature_sines() {
        let n = 2000;
        let v = sine(n, 325.0, -0.3);
        let i = sine(n, 10.0, -0.3 - PI / 2.0);
        let estimate = estimate_power(&v, &i, 0.0).unwrap();

        assert_abs_diff_eq!(estimate.real_power, 0.0, epsilon = 1e-6);
        assert_relative_eq!(estimate.apparent_power, 325.0 * 10.0 / 2.0, epsilon = 1e-6);
        assert_relative_eq!(estimate.power_factor, 1.0, epsilon = 1e-9);
        // Current lags by a quarter cycle
        assert_abs_diff_eq!(estimate.phase_difference_deg, 90.0, epsilon = 0.5);
    }

    #[test]
    fn test_phase_difference_sign_flips_on_swap() {
        let n = 2000;
        let v = sine(n, 1.0, -0.1);
        let i = sine(n, 1.0, -0.1 - PI / 3.0);

        let forward = phase_difference(&v, &i).unwrap();
        let reverse = phase_difference(&i, &v).unwrap();

        assert!(forward > 0.0);
        assert_eq!(forward, -reverse);
    }

    #[test]
    fn test_phase_difference_without_crossings_is_zero() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        let i = vec![1.0, -1.0, 1.0, -1.0];
        assert_eq!(phase_difference(&v, &i).unwrap(), 0.0);
        assert_eq!(phase_difference(&i, &v).unwrap(), 0.0);
    }

    #[test]
    fn test_phase_difference_index_scaling() {
        let mut v = vec![1.0; 8];
        let mut i = vec![1.0; 8];
        v[2] = -1.0;
        i[4] = -1.0;
        // (4 - 2) / 8 of a cycle
        assert_relative_eq!(phase_difference(&v, &i).unwrap(), 90.0);
    }

    #[test]
    fn test_phase_independent_of_sample_interval() {
        let v = vec![10.0, -10.0, 10.0, -10.0];
        let i = vec![5.0, 5.0, -5.0, 5.0];
        // First crossings at 1 and 2 of a 4 sample window
        assert_relative_eq!(phase_difference(&v, &i).unwrap(), 90.0);

        let estimator = PowerEstimator::new(&CalibrationConfig::default());
        let estimate = estimator.estimate(&v, &i).unwrap();
        assert!(estimate.phase_difference_deg.is_finite());
        assert_relative_eq!(estimate.phase_difference_deg, 90.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        let result = estimate_power(&[1.0, 2.0], &[1.0], 0.0);
        assert!(matches!(
            result,
            Err(MonitorError::InsufficientData {
                needed: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_empty_buffers() {
        assert!(matches!(
            estimate_power(&[], &[], 0.0),
            Err(MonitorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_non_finite_sample_is_arithmetic_fault() {
        let v = vec![1.0, f64::NAN, 1.0];
        let i = vec![1.0, 1.0, 1.0];
        assert!(matches!(
            estimate_power(&v, &i, 0.0),
            Err(MonitorError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_estimate_or_zero_degrades() {
        let estimator = PowerEstimator::new(&CalibrationConfig::default());
        let estimate = estimator.estimate_or_zero(&[f64::INFINITY, 1.0], &[1.0, 1.0]);
        assert_eq!(estimate, PowerEstimate::zeroed());
    }

    #[test]
    fn test_estimator_applies_offset() {
        let estimator = PowerEstimator::new(&CalibrationConfig::default());
        let zeros = vec![0.0; 16];
        let estimate = estimator.estimate(&zeros, &zeros).unwrap();
        assert_eq!(estimate.apparent_power, 230.0);
        assert_eq!(estimate.power_factor, 1.0);
    }
}
