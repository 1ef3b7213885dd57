//! Fixed parameters of the measurement pipeline
//!
//! Sampling geometry, ADC range and display geometry. Values that vary
//! between calibration profiles live in [`crate::config`] instead.

/// Number of samples per channel in one acquisition window.
pub const SAMPLE_COUNT: usize = 2000;

/// Pause between consecutive sample indices in microseconds.
/// `SAMPLE_COUNT * SAMPLE_INTERVAL_US` is the nominal window length (200 ms).
pub const SAMPLE_INTERVAL_US: u64 = 100;

/// Largest raw value a 12-bit ADC read can produce.
pub const ADC_MAX: u16 = 4095;

/// Digits on the numeric (RPM) display.
pub const DIGIT_WIDTH: usize = 4;

/// Rows on the character LCD.
pub const LCD_ROWS: usize = 4;

/// Columns on the character LCD.
pub const LCD_COLUMNS: usize = 20;

/// Pause after each rendered power reading, in milliseconds.
pub const DEFAULT_CYCLE_PAUSE_MS: u64 = 500;

/// Default RPM timer period in milliseconds.
pub const DEFAULT_TIMER_INTERVAL_MS: u64 = 100;
