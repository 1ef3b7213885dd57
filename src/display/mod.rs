//! Display sinks
//!
//! Two narrow interfaces: a numeric display that shows a zero-padded
//! integer (the RPM readout) and a character display that shows a short
//! multi-line text (the power readout). Segment encoding and bus details
//! belong to the implementations.

pub mod console;

pub use console::{ConsoleNumericDisplay, ConsoleTextDisplay, StreamTextDisplay};

use crate::constants::{LCD_COLUMNS, LCD_ROWS};
use crate::error::Result;

/// Multi-digit numeric display
pub trait NumericDisplay: Send {
    /// Bring up the device; called once before the first reading
    fn configure(&mut self) -> Result<()> {
        Ok(())
    }

    /// Show an already formatted digit string
    fn show(&mut self, digits: &str) -> Result<()>;
}

/// Character display, replaced in full on every write
pub trait TextDisplay: Send {
    fn clear(&mut self) -> Result<()>;

    fn write(&mut self, text: &str) -> Result<()>;
}

/// Zero-pad `value` to `width` digits
///
/// Values that need more digits than the display has saturate at the
/// largest representable value (9999 for four digits).
pub fn format_digits(value: u32, width: usize) -> String {
    let max = 10u64
        .checked_pow(width as u32)
        .map_or(u64::MAX, |limit| limit - 1);
    let shown = u64::from(value).min(max);
    format!("{:0width$}", shown, width = width)
}

/// Trim text to the character display geometry
///
/// Keeps the first [`LCD_ROWS`] lines and the first [`LCD_COLUMNS`]
/// characters of each.
pub fn fit_lines(text: &str) -> Vec<String> {
    text.lines()
        .take(LCD_ROWS)
        .map(|line| line.chars().take(LCD_COLUMNS).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_digits_pads() {
        assert_eq!(format_digits(7, 4), "0007");
        assert_eq!(format_digits(540, 4), "0540");
        assert_eq!(format_digits(0, 4), "0000");
        assert_eq!(format_digits(1234, 4), "1234");
    }

    #[test]
    fn test_format_digits_saturates() {
        assert_eq!(format_digits(12345, 4), "9999");
        assert_eq!(format_digits(u32::MAX, 2), "99");
        assert_eq!(format_digits(u32::MAX, 12), "004294967295");
    }

    #[test]
    fn test_fit_lines() {
        let lines = fit_lines("a\nb\nthis line is definitely too long\nd\ne");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "this line is definit");
        assert_eq!(lines[3], "d");
    }
}
