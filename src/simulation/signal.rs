use std::f64::consts::PI;

use crate::constants::ADC_MAX;

/// Mains-frequency tone as seen by a biased ADC input, in counts
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct MainsSignal {
    pub frequency_hz: f64,
    /// Peak deviation from the bias, in counts
    pub amplitude_counts: f64,
    /// DC level the input is biased to, in counts
    pub bias_counts: f64,
    /// Phase at t = 0, in degrees
    pub phase_deg: f64,
    /// Third harmonic amplitude relative to the fundamental
    pub third_harmonic: f64,
}

impl Default for MainsSignal {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            amplitude_counts: 1800.0,
            bias_counts: f64::from(ADC_MAX) / 2.0,
            phase_deg: 0.0,
            third_harmonic: 0.0,
        }
    }
}

impl MainsSignal {
    /// Copy of this signal delayed by `lag_deg` of the fundamental
    pub fn lagging(&self, lag_deg: f64) -> Self {
        Self {
            phase_deg: self.phase_deg - lag_deg,
            ..self.clone()
        }
    }

    pub fn with_amplitude(mut self, amplitude_counts: f64) -> Self {
        self.amplitude_counts = amplitude_counts;
        self
    }

    /// Value in counts at `t` seconds, before quantization
    pub fn at(&self, t: f64) -> f64 {
        let theta = 2.0 * PI * self.frequency_hz * t + self.phase_deg.to_radians();
        let fundamental = theta.sin();
        let harmonic = self.third_harmonic * (3.0 * theta).sin();
        self.bias_counts + self.amplitude_counts * (fundamental + harmonic)
    }
}

/// Sample `signal` at a fixed interval
pub fn generate_mains_signal(
    signal: &MainsSignal,
    sample_count: usize,
    sample_interval_us: u64,
) -> Vec<f64> {
    let dt = sample_interval_us as f64 * 1e-6;
    (0..sample_count).map(|i| signal.at(i as f64 * dt)).collect()
}

/// Round and clamp to the ADC range
pub fn to_counts(value: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(ADC_MAX)) as u16
}
