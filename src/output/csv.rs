use super::{Formatter, iso8601_timestamp};
use crate::power::PowerEstimate;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, reading: &PowerEstimate) -> String {
        format!(
            "{},{:.3},{:.3},{:.1},{:.1},{:.3},{:.2}",
            iso8601_timestamp(),
            reading.vrms,
            reading.irms,
            reading.real_power,
            reading.apparent_power,
            reading.power_factor,
            reading.phase_difference_deg
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,vrms,irms,real_power,apparent_power,power_factor,phase_deg")
    }
}
