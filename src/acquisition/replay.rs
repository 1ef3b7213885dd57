use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use super::AnalogChannel;
use crate::config::Attenuation;
use crate::constants::ADC_MAX;
use crate::error::{MonitorError, Result};

/// Analog channel that replays recorded raw ADC counts
///
/// Captures are stereo WAV files: left = voltage channel, right = current
/// channel. Integer samples are taken as raw counts; float samples in
/// [-1, 1] are mapped onto the 12-bit range.
pub struct ReplayChannel {
    samples: Vec<u16>,
    position: usize,
    looping: bool,
}

impl ReplayChannel {
    pub fn new(samples: Vec<u16>, looping: bool) -> Self {
        Self {
            samples,
            position: 0,
            looping,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AnalogChannel for ReplayChannel {
    fn configure(&mut self, attenuation: Attenuation) -> Result<()> {
        if self.samples.is_empty() {
            return Err(MonitorError::Adc("replay capture is empty".into()));
        }
        log::debug!(
            "Replay channel: {} samples, attenuation {} ignored",
            self.samples.len(),
            attenuation
        );
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16> {
        if self.position >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                return Err(MonitorError::Adc("replay capture exhausted".into()));
            }
            self.position = 0;
        }
        let sample = self.samples[self.position];
        self.position += 1;
        Ok(sample)
    }
}

/// Load a stereo capture into (voltage, current) replay channels
pub fn load_capture<P: AsRef<Path>>(path: P, looping: bool) -> Result<(ReplayChannel, ReplayChannel)> {
    if !path.as_ref().exists() {
        return Err(MonitorError::DeviceNotFound(format!(
            "capture {} does not exist",
            path.as_ref().display()
        )));
    }

    let reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.channels != 2 {
        return Err(MonitorError::Adc(format!(
            "expected stereo capture, got {} channels",
            spec.channels
        )));
    }

    let interleaved = read_counts(reader, &spec)?;
    let mut voltage = Vec::with_capacity(interleaved.len() / 2);
    let mut current = Vec::with_capacity(interleaved.len() / 2);
    for pair in interleaved.chunks_exact(2) {
        voltage.push(pair[0]);
        current.push(pair[1]);
    }

    log::info!(
        "Loaded capture {}: {} samples per channel at {} Hz",
        path.as_ref().display(),
        voltage.len(),
        spec.sample_rate
    );

    Ok((
        ReplayChannel::new(voltage, looping),
        ReplayChannel::new(current, looping),
    ))
}

fn read_counts(mut reader: WavReader<BufReader<File>>, spec: &hound::WavSpec) -> Result<Vec<u16>> {
    let counts = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v.clamp(0, i32::from(u16::MAX)) as u16))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| {
                s.map(|v| {
                    let unit = (f64::from(v) + 1.0) / 2.0;
                    (unit.clamp(0.0, 1.0) * f64::from(ADC_MAX)).round() as u16
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_loops() {
        let mut channel = ReplayChannel::new(vec![1, 2], true);
        channel.configure(Attenuation::Db11).unwrap();
        let reads: Vec<u16> = (0..5).map(|_| channel.read_raw().unwrap()).collect();
        assert_eq!(reads, vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn test_replay_exhausts_without_loop() {
        let mut channel = ReplayChannel::new(vec![7], false);
        assert_eq!(channel.read_raw().unwrap(), 7);
        assert!(matches!(channel.read_raw(), Err(MonitorError::Adc(_))));
    }

    #[test]
    fn test_empty_capture_fails_configuration() {
        let mut channel = ReplayChannel::new(Vec::new(), true);
        assert!(channel.configure(Attenuation::Db0).is_err());
        assert!(channel.is_empty());
    }

    #[test]
    fn test_missing_capture_is_device_not_found() {
        let result = load_capture("/nonexistent/powertach/capture.wav", true);
        assert!(matches!(result, Err(MonitorError::DeviceNotFound(_))));
    }
}
