use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::noise::create_rng;
use super::signal::{MainsSignal, to_counts};
use crate::acquisition::AnalogChannel;
use crate::config::Attenuation;
use crate::error::{MonitorError, Result};

/// ADC channel producing a live mains waveform
///
/// Each read advances the waveform by one sample interval, so reads map to
/// time the same way the sampler's fixed-interval loop does.
pub struct SineChannel {
    signal: MainsSignal,
    interval_s: f64,
    index: u64,
    noise: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl SineChannel {
    pub fn new(signal: MainsSignal, sample_interval_us: u64) -> Self {
        Self {
            signal,
            interval_s: sample_interval_us as f64 * 1e-6,
            index: 0,
            noise: None,
            rng: create_rng(None),
        }
    }

    /// Add Gaussian noise with the given deviation in counts
    pub fn with_noise(mut self, std_counts: f64, seed: Option<u64>) -> Result<Self> {
        if !std_counts.is_finite() || std_counts < 0.0 {
            return Err(MonitorError::Config(format!(
                "noise deviation must be finite and non-negative, got {}",
                std_counts
            )));
        }
        let normal = Normal::new(0.0, std_counts)
            .map_err(|e| MonitorError::Config(format!("noise deviation {}: {}", std_counts, e)))?;
        self.noise = Some(normal);
        self.rng = create_rng(seed);
        Ok(self)
    }
}

impl AnalogChannel for SineChannel {
    fn configure(&mut self, attenuation: Attenuation) -> Result<()> {
        log::debug!(
            "Simulated channel at {} Hz, attenuation {}",
            self.signal.frequency_hz,
            attenuation
        );
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16> {
        let t = self.index as f64 * self.interval_s;
        self.index += 1;

        let mut value = self.signal.at(t);
        if let Some(ref normal) = self.noise {
            value += normal.sample(&mut self.rng);
        }
        Ok(to_counts(value))
    }
}
