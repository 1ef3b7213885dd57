use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::error::{MonitorError, Result};
use crate::rpm::{EdgeHandler, EdgeInput, Pull};

/// Hall sensor on a shaft turning at a constant rate
///
/// Fires the edge handler `pulse_hz` times per second from a background
/// thread until detached. A rate of zero models a stationary shaft.
pub struct SimulatedHallSensor {
    pulse_hz: f64,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedHallSensor {
    pub fn new(pulse_hz: f64) -> Result<Self> {
        if !pulse_hz.is_finite() || pulse_hz < 0.0 {
            return Err(MonitorError::Config(format!(
                "pulse rate must be a non-negative number, got {}",
                pulse_hz
            )));
        }
        Ok(Self {
            pulse_hz,
            stop_tx: None,
            worker: None,
        })
    }

    /// Pulse rate for a shaft speed, given pulses per revolution
    pub fn from_rpm(rpm: f64, pulses_per_rev: u32) -> Result<Self> {
        Self::new(rpm * f64::from(pulses_per_rev) / 60.0)
    }

    pub fn pulse_hz(&self) -> f64 {
        self.pulse_hz
    }
}

impl EdgeInput for SimulatedHallSensor {
    fn attach_rising(&mut self, pull: Pull, handler: EdgeHandler) -> Result<()> {
        if self.worker.is_some() {
            return Err(MonitorError::Interrupt("handler already attached".into()));
        }
        log::debug!(
            "Simulated Hall sensor: {:.1} pulses/s, pull {:?}",
            self.pulse_hz,
            pull
        );
        if self.pulse_hz == 0.0 {
            return Ok(());
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let pulses = tick(Duration::from_secs_f64(1.0 / self.pulse_hz));

        let worker = std::thread::Builder::new()
            .name("hall-sensor".into())
            .spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(pulses) -> _ => handler(),
                    }
                }
            })?;

        self.stop_tx = Some(stop_tx);
        self.worker = Some(worker);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("Hall sensor thread panicked");
        }
    }
}

impl Drop for SimulatedHallSensor {
    fn drop(&mut self) {
        self.detach();
    }
}
