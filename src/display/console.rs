use std::io::Write;

use super::{NumericDisplay, TextDisplay, fit_lines};
use crate::constants::LCD_COLUMNS;
use crate::error::{MonitorError, Result};

/// Character display drawn as a framed box on a terminal stream
pub struct ConsoleTextDisplay {
    out: Box<dyn Write + Send>,
}

impl ConsoleTextDisplay {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

impl TextDisplay for ConsoleTextDisplay {
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let border = format!("+{}+", "-".repeat(LCD_COLUMNS));
        let mut frame = String::new();
        frame.push_str(&border);
        frame.push('\n');
        for line in fit_lines(text) {
            frame.push_str(&format!("|{:<width$}|\n", line, width = LCD_COLUMNS));
        }
        frame.push_str(&border);
        frame.push('\n');

        self.out
            .write_all(frame.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| MonitorError::Display(e.to_string()))
    }
}

/// Text sink that appends each write as plain lines (JSON / CSV streams)
pub struct StreamTextDisplay {
    out: Box<dyn Write + Send>,
}

impl StreamTextDisplay {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

impl TextDisplay for StreamTextDisplay {
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)
            .and_then(|_| self.out.flush())
            .map_err(|e| MonitorError::Display(e.to_string()))
    }
}

/// Numeric display that reports changes through the log
pub struct ConsoleNumericDisplay {
    last: Option<String>,
}

impl ConsoleNumericDisplay {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for ConsoleNumericDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl NumericDisplay for ConsoleNumericDisplay {
    fn show(&mut self, digits: &str) -> Result<()> {
        if self.last.as_deref() != Some(digits) {
            log::info!("RPM [{}]", digits);
            self.last = Some(digits.to_string());
        }
        Ok(())
    }
}
