use std::time::Duration;

use crate::acquisition::{AnalogChannel, SampleBuffer};
use crate::config::{CalibrationConfig, SamplingConfig};
use crate::error::Result;

/// Fixed-rate two-channel waveform sampler
///
/// Each cycle reads `sample_count` pairs of raw samples, scales them with
/// the per-channel calibration factor and stores them in place. A pause of
/// `sample_interval` follows every index, so one cycle lasts roughly
/// `sample_count * sample_interval` plus read latency.
///
/// Raw readings are not validated: an out-of-range count is scaled and
/// stored like any other.
pub struct WaveformSampler {
    voltage: Box<dyn AnalogChannel>,
    current: Box<dyn AnalogChannel>,
    pt_scale_factor: f64,
    ct_scale_factor: f64,
    sample_interval: Duration,
    voltage_buf: SampleBuffer,
    current_buf: SampleBuffer,
}

impl WaveformSampler {
    /// Configure both channels and allocate the sample buffers
    ///
    /// Fails if either channel rejects its configuration.
    pub fn new(
        mut voltage: Box<dyn AnalogChannel>,
        mut current: Box<dyn AnalogChannel>,
        sampling: &SamplingConfig,
        calibration: &CalibrationConfig,
    ) -> Result<Self> {
        voltage.configure(sampling.attenuation)?;
        current.configure(sampling.attenuation)?;

        log::info!(
            "Sampler: {} samples every {} us, attenuation {}",
            sampling.sample_count,
            sampling.sample_interval_us,
            sampling.attenuation
        );

        Ok(Self {
            voltage,
            current,
            pt_scale_factor: calibration.pt_scale_factor,
            ct_scale_factor: calibration.ct_scale_factor,
            sample_interval: Duration::from_micros(sampling.sample_interval_us),
            voltage_buf: SampleBuffer::new(sampling.sample_count),
            current_buf: SampleBuffer::new(sampling.sample_count),
        })
    }

    /// Fill both buffers with one window of scaled samples
    ///
    /// Returns (voltage, current). A read error aborts the cycle; the
    /// buffers then hold a mix of old and new samples and must not be used.
    pub fn acquire_cycle(&mut self) -> Result<(&SampleBuffer, &SampleBuffer)> {
        for i in 0..self.voltage_buf.len() {
            let v = self.voltage.read_raw()?;
            let c = self.current.read_raw()?;
            self.voltage_buf.set(i, f64::from(v) * self.pt_scale_factor);
            self.current_buf.set(i, f64::from(c) * self.ct_scale_factor);

            if !self.sample_interval.is_zero() {
                std::thread::sleep(self.sample_interval);
            }
        }

        Ok((&self.voltage_buf, &self.current_buf))
    }

    pub fn sample_count(&self) -> usize {
        self.voltage_buf.len()
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}
