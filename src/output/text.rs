use super::Formatter;
use crate::config::LcdLayout;
use crate::power::PowerEstimate;

/// Character display text, one quantity per row
pub struct LcdFormatter {
    layout: LcdLayout,
}

impl LcdFormatter {
    pub fn new(layout: LcdLayout) -> Self {
        Self { layout }
    }
}

impl Formatter for LcdFormatter {
    fn format(&self, reading: &PowerEstimate) -> String {
        match self.layout {
            LcdLayout::RealPower => format!(
                "Vrms: {:.2}V\nIrms: {:.2}A\nReal_P: {:.0}W\nPF: {:.2}",
                reading.vrms, reading.irms, reading.real_power, reading.power_factor
            ),
            LcdLayout::PowerSummary => format!(
                "Vrms: {:.2}V\nIrms: {:.2}A\nP: {:.0}W | S: {:.0}\nPF: {:.2}",
                reading.vrms,
                reading.irms,
                reading.real_power,
                reading.apparent_power,
                reading.power_factor
            ),
        }
    }
}
