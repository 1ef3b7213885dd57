//! Configuration for the powertach monitor.
//!
//! ## Calibration profiles
//!
//! Three field calibrations are known. They differ in scale factors, the
//! apparent power offset, the RPM multiplier and window, and in which
//! correction hooks run after estimation. Pick one with
//! [`MonitorConfig::from_profile`]:
//!
//! ```
//! use powertach::config::{CalibrationProfile, MonitorConfig};
//!
//! let config = MonitorConfig::from_profile(CalibrationProfile::Bench);
//! assert_eq!(config.rpm.moving_average_window, 25);
//! ```
//!
//! `MonitorConfig::default()` is the `offset230` profile.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_CYCLE_PAUSE_MS, DEFAULT_TIMER_INTERVAL_MS, DIGIT_WIDTH, SAMPLE_COUNT,
    SAMPLE_INTERVAL_US,
};
use crate::error::{MonitorError, Result};
use crate::power::{PowerFactorCorrection, ReadingCorrection};

/// Input attenuation of an ADC channel
///
/// Sets the full-scale input voltage of the converter. Raw readings stay
/// 12-bit regardless of the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Attenuation {
    /// ~1.1 V full scale
    #[serde(rename = "0db")]
    Db0,
    /// ~1.5 V full scale
    #[serde(rename = "2.5db")]
    Db2_5,
    /// ~2.2 V full scale
    #[serde(rename = "6db")]
    Db6,
    /// ~3.9 V full scale
    #[default]
    #[serde(rename = "11db")]
    Db11,
}

impl Attenuation {
    /// Approximate full-scale input voltage
    pub fn full_scale_volts(&self) -> f64 {
        match self {
            Self::Db0 => 1.1,
            Self::Db2_5 => 1.5,
            Self::Db6 => 2.2,
            Self::Db11 => 3.9,
        }
    }
}

impl fmt::Display for Attenuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Db0 => "0db",
            Self::Db2_5 => "2.5db",
            Self::Db6 => "6db",
            Self::Db11 => "11db",
        };
        f.write_str(s)
    }
}

impl FromStr for Attenuation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "0db" => Ok(Self::Db0),
            "2.5" | "2.5db" => Ok(Self::Db2_5),
            "6" | "6db" => Ok(Self::Db6),
            "11" | "11db" => Ok(Self::Db11),
            other => Err(format!("invalid attenuation: {}", other)),
        }
    }
}

/// Known field calibrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationProfile {
    /// No apparent power offset, no corrections
    Baseline,
    /// Apparent power offset of 230
    #[default]
    Offset230,
    /// Bench rig: offset 200, power factor nudge and display-side offsets
    Bench,
}

impl fmt::Display for CalibrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Baseline => "baseline",
            Self::Offset230 => "offset230",
            Self::Bench => "bench",
        };
        f.write_str(s)
    }
}

/// Layout of the 4x20 character display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LcdLayout {
    /// Vrms, Irms, real power, power factor
    #[default]
    RealPower,
    /// Vrms, Irms, real and apparent power on one row, power factor
    PowerSummary,
}

/// System-wide monitor configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Waveform acquisition configuration
    pub sampling: SamplingConfig,
    /// Scale factors, offsets and correction hooks
    pub calibration: CalibrationConfig,
    /// Rotation rate estimator configuration
    pub rpm: RpmConfig,
    /// Display configuration
    pub display: DisplayConfig,
}

/// Waveform acquisition configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Samples per channel per cycle
    pub sample_count: usize,
    /// Pause between sample indices in microseconds
    pub sample_interval_us: u64,
    /// ADC input attenuation for both channels
    pub attenuation: Attenuation,
    /// Pause after rendering each reading in milliseconds
    pub cycle_pause_ms: u64,
}

/// Calibration constants and hooks
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Raw ADC counts to volts
    pub pt_scale_factor: f64,
    /// Raw ADC counts to amps
    pub ct_scale_factor: f64,
    /// Empirical bias added to vrms * irms
    pub apparent_power_offset: f64,
    /// Post-processing applied to the power factor
    pub power_factor_correction: PowerFactorCorrection,
    /// Display-side correction of the rendered figures
    pub reading_correction: ReadingCorrection,
}

/// Rotation rate estimator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpmConfig {
    /// Timer period in milliseconds
    pub timer_interval_ms: u64,
    /// RPM per pulse counted in one timer period
    pub rpm_multiplier: u32,
    /// Moving average window in ticks
    pub moving_average_window: usize,
}

/// Display configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Text display layout
    pub layout: LcdLayout,
    /// Zero-padded width of the RPM display
    pub digit_width: usize,
}

impl MonitorConfig {
    /// Build the configuration of a known calibration profile
    pub fn from_profile(profile: CalibrationProfile) -> Self {
        match profile {
            CalibrationProfile::Baseline => Self {
                calibration: CalibrationConfig {
                    apparent_power_offset: 0.0,
                    ..CalibrationConfig::default()
                },
                ..Self::default()
            },
            CalibrationProfile::Offset230 => Self::default(),
            CalibrationProfile::Bench => Self {
                sampling: SamplingConfig::default(),
                calibration: CalibrationConfig {
                    pt_scale_factor: 0.25,
                    ct_scale_factor: 0.054,
                    apparent_power_offset: 200.0,
                    power_factor_correction: PowerFactorCorrection::CurrentBandNudge,
                    reading_correction: ReadingCorrection::SpeedBandOffsets,
                },
                rpm: RpmConfig {
                    timer_interval_ms: DEFAULT_TIMER_INTERVAL_MS,
                    rpm_multiplier: 569,
                    moving_average_window: 25,
                },
                display: DisplayConfig {
                    layout: LcdLayout::PowerSummary,
                    ..DisplayConfig::default()
                },
            },
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.sampling.sample_count < 2 {
            return Err(MonitorError::Config(format!(
                "sample_count must be at least 2, got {}",
                self.sampling.sample_count
            )));
        }
        if self.sampling.sample_interval_us == 0 {
            return Err(MonitorError::Config(
                "sample_interval_us must be positive".into(),
            ));
        }
        if !self.calibration.pt_scale_factor.is_finite()
            || !self.calibration.ct_scale_factor.is_finite()
        {
            return Err(MonitorError::Config("scale factors must be finite".into()));
        }
        if !self.calibration.apparent_power_offset.is_finite() {
            return Err(MonitorError::Config(
                "apparent_power_offset must be finite".into(),
            ));
        }
        if self.rpm.timer_interval_ms == 0 {
            return Err(MonitorError::Config(
                "timer_interval_ms must be positive".into(),
            ));
        }
        if self.rpm.moving_average_window == 0 {
            return Err(MonitorError::Config(
                "moving_average_window must be positive".into(),
            ));
        }
        if self.display.digit_width == 0 {
            return Err(MonitorError::Config("digit_width must be positive".into()));
        }
        Ok(())
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: SAMPLE_COUNT,
            sample_interval_us: SAMPLE_INTERVAL_US,
            attenuation: Attenuation::Db11,
            cycle_pause_ms: DEFAULT_CYCLE_PAUSE_MS,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            pt_scale_factor: 0.218,
            ct_scale_factor: 0.051,
            apparent_power_offset: 230.0,
            power_factor_correction: PowerFactorCorrection::None,
            reading_correction: ReadingCorrection::None,
        }
    }
}

impl Default for RpmConfig {
    fn default() -> Self {
        Self {
            timer_interval_ms: DEFAULT_TIMER_INTERVAL_MS,
            rpm_multiplier: 180,
            moving_average_window: 70,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            layout: LcdLayout::RealPower,
            digit_width: DIGIT_WIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_offset230_profile() {
        let config = MonitorConfig::default();
        assert_eq!(config.calibration.apparent_power_offset, 230.0);
        assert_eq!(config.rpm.rpm_multiplier, 180);
        assert_eq!(config.rpm.moving_average_window, 70);
        assert_eq!(config.sampling.sample_count, 2000);
        assert_eq!(config.sampling.sample_interval_us, 100);
    }

    #[test]
    fn test_profiles() {
        let baseline = MonitorConfig::from_profile(CalibrationProfile::Baseline);
        assert_eq!(baseline.calibration.apparent_power_offset, 0.0);
        assert_eq!(
            baseline.calibration.power_factor_correction,
            PowerFactorCorrection::None
        );

        let bench = MonitorConfig::from_profile(CalibrationProfile::Bench);
        assert_eq!(bench.calibration.pt_scale_factor, 0.25);
        assert_eq!(bench.calibration.ct_scale_factor, 0.054);
        assert_eq!(bench.calibration.apparent_power_offset, 200.0);
        assert_eq!(bench.rpm.rpm_multiplier, 569);
        assert_eq!(bench.display.layout, LcdLayout::PowerSummary);
        assert_eq!(
            bench.calibration.reading_correction,
            ReadingCorrection::SpeedBandOffsets
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [calibration]
            apparent_power_offset = 200.0
            power_factor_correction = "current_band_nudge"

            [rpm]
            rpm_multiplier = 569

            [sampling]
            attenuation = "6db"
            "#,
        )
        .unwrap();

        assert_eq!(config.calibration.apparent_power_offset, 200.0);
        assert_eq!(config.calibration.pt_scale_factor, 0.218);
        assert_eq!(
            config.calibration.power_factor_correction,
            PowerFactorCorrection::CurrentBandNudge
        );
        assert_eq!(config.rpm.rpm_multiplier, 569);
        assert_eq!(config.rpm.moving_average_window, 70);
        assert_eq!(config.sampling.attenuation, Attenuation::Db6);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let result = MonitorConfig::from_toml_str("[rpm]\nmoving_average_window = 0\n");
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timer_interval() {
        let mut config = MonitorConfig::default();
        config.rpm.timer_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_attenuation_parse() {
        assert_eq!("11db".parse::<Attenuation>().unwrap(), Attenuation::Db11);
        assert_eq!("2.5".parse::<Attenuation>().unwrap(), Attenuation::Db2_5);
        assert!("3db".parse::<Attenuation>().is_err());
    }
}
