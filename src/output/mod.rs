mod csv;
mod json;
mod text;

use chrono::Utc;

use crate::config::LcdLayout;
use crate::power::PowerEstimate;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::LcdFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Four short lines for a 4x20 character display
    Lcd,
    Json,
    Csv,
}

/// Renders one power reading as display or log text
pub trait Formatter: Send {
    fn format(&self, reading: &PowerEstimate) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, layout: LcdLayout) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Lcd => Box::new(LcdFormatter::new(layout)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
