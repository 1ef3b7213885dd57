use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::power::PowerEstimate;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    reading: &'a PowerEstimate,
}

impl Formatter for JsonFormatter {
    fn format(&self, reading: &PowerEstimate) -> String {
        let line = JsonLine {
            ts: iso8601_timestamp(),
            reading,
        };
        serde_json::to_string(&line).unwrap_or_else(|e| {
            log::error!("JSON encoding failed: {}", e);
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fields() {
        let reading = PowerEstimate {
            vrms: 230.0,
            irms: 4.0,
            real_power: 800.0,
            apparent_power: 920.0,
            power_factor: 0.5,
            phase_difference_deg: 30.0,
        };
        let text = JsonFormatter.format(&reading);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert!(value["ts"].is_string());
        assert_eq!(value["vrms"], 230.0);
        assert_eq!(value["real_power"], 800.0);
        assert_eq!(value["power_factor"], 0.5);
        assert_eq!(value["phase_difference_deg"], 30.0);
    }
}
