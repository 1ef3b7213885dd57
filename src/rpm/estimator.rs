use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{EdgeHandler, EdgeInput, PeriodicTimer, Pull, PulseCounter, TickHandler};
use crate::config::RpmConfig;
use crate::display::{NumericDisplay, format_digits};
use crate::error::{MonitorError, Result};
use crate::signal_processing::MovingAverageRing;

/// Lifecycle of the rotation rate estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpmState {
    /// Constructed, nothing attached
    Idle,
    /// Edge handler installed, timer not yet running
    Armed,
    /// Edge handler and timer active
    Running,
    /// Shut down; cannot be restarted
    Stopped,
}

impl RpmState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RpmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpmReading {
    /// Edges counted during the tick
    pub pulses: u32,
    /// `pulses * rpm_multiplier`
    pub raw_rpm: u32,
    /// Integer mean of the whole moving average ring
    pub smoothed_rpm: u32,
}

struct TickState {
    ring: MovingAverageRing,
    display: Box<dyn NumericDisplay>,
    last: Option<RpmReading>,
    fault: Option<String>,
}

/// State shared by the edge handler and the timer tick
///
/// The edge path touches only the atomic pulse counter. The tick path
/// takes the counter, then updates the ring and the display under a lock
/// the edge path never waits on.
pub struct RpmCore {
    pulses: PulseCounter,
    rpm_multiplier: u32,
    digit_width: usize,
    tick: Mutex<TickState>,
}

impl RpmCore {
    fn new(config: &RpmConfig, digit_width: usize, display: Box<dyn NumericDisplay>) -> Self {
        Self {
            pulses: PulseCounter::new(),
            rpm_multiplier: config.rpm_multiplier,
            digit_width,
            tick: Mutex::new(TickState {
                ring: MovingAverageRing::new(config.moving_average_window),
                display,
                last: None,
                fault: None,
            }),
        }
    }

    /// Rising edge on the sensor input
    pub fn on_edge(&self) {
        self.pulses.increment();
    }

    /// Timer period elapsed: convert, smooth and render
    pub fn on_tick(&self) -> Result<RpmReading> {
        let pulses = self.pulses.take();
        let raw_rpm = pulses.saturating_mul(self.rpm_multiplier);

        let mut state = self.lock_tick()?;
        let smoothed_rpm = state.ring.add(raw_rpm);
        let reading = RpmReading {
            pulses,
            raw_rpm,
            smoothed_rpm,
        };
        state.last = Some(reading);

        log::trace!(
            "RPM tick: {} pulses, raw {}, smoothed {}",
            pulses,
            raw_rpm,
            smoothed_rpm
        );

        let digits = format_digits(smoothed_rpm, self.digit_width);
        if let Err(e) = state.display.show(&digits) {
            state.fault = Some(e.to_string());
            return Err(e);
        }
        Ok(reading)
    }

    pub fn pulse_counter(&self) -> &PulseCounter {
        &self.pulses
    }

    pub fn last_reading(&self) -> Option<RpmReading> {
        self.tick.lock().ok().and_then(|s| s.last)
    }

    /// First error raised by a tick, if any
    pub fn fault(&self) -> Option<String> {
        match self.tick.lock() {
            Ok(state) => state.fault.clone(),
            Err(_) => Some("tick state poisoned".into()),
        }
    }

    fn lock_tick(&self) -> Result<std::sync::MutexGuard<'_, TickState>> {
        self.tick
            .lock()
            .map_err(|_| MonitorError::Timer("tick state poisoned".into()))
    }
}

/// Pulse-counting RPM estimator
///
/// Counts rising edges between timer ticks, scales the count by the RPM
/// multiplier and shows the moving average on a numeric display. Once
/// started it runs on its own until [`shutdown`](Self::shutdown) or drop.
pub struct RotationRateEstimator {
    core: Arc<RpmCore>,
    state: RpmState,
    timer_interval: Duration,
    input: Option<Box<dyn EdgeInput>>,
    timer: Option<Box<dyn PeriodicTimer>>,
}

impl RotationRateEstimator {
    pub fn new(
        config: &RpmConfig,
        digit_width: usize,
        display: Box<dyn NumericDisplay>,
    ) -> Result<Self> {
        if config.moving_average_window == 0 {
            return Err(MonitorError::Config(
                "moving_average_window must be positive".into(),
            ));
        }
        if config.timer_interval_ms == 0 {
            return Err(MonitorError::Config(
                "timer_interval_ms must be positive".into(),
            ));
        }

        Ok(Self {
            core: Arc::new(RpmCore::new(config, digit_width, display)),
            state: RpmState::Idle,
            timer_interval: Duration::from_millis(config.timer_interval_ms),
            input: None,
            timer: None,
        })
    }

    /// Configure the display, attach the edge handler and start the timer
    ///
    /// Any failure leaves nothing attached and is meant to be fatal.
    pub fn start(
        &mut self,
        mut input: Box<dyn EdgeInput>,
        mut timer: Box<dyn PeriodicTimer>,
    ) -> Result<()> {
        self.expect_state(RpmState::Idle)?;

        self.core.lock_tick()?.display.configure()?;

        let edge_core = Arc::clone(&self.core);
        let on_edge: EdgeHandler = Arc::new(move || edge_core.on_edge());
        input.attach_rising(Pull::Down, on_edge)?;
        self.state = RpmState::Armed;

        let tick_core = Arc::clone(&self.core);
        let on_tick: TickHandler = Box::new(move || tick_core.on_tick().map(|_| ()));
        if let Err(e) = timer.start(self.timer_interval, on_tick) {
            input.detach();
            self.state = RpmState::Idle;
            return Err(e);
        }

        self.input = Some(input);
        self.timer = Some(timer);
        self.state = RpmState::Running;
        log::info!(
            "RPM estimator running: {} ms ticks, multiplier {}",
            self.timer_interval.as_millis(),
            self.core.rpm_multiplier
        );
        Ok(())
    }

    /// Stop the timer and detach the edge handler
    ///
    /// Idempotent. The estimator cannot be restarted afterwards.
    pub fn shutdown(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        if let Some(mut input) = self.input.take() {
            input.detach();
        }
        if self.state != RpmState::Stopped {
            log::info!("RPM estimator stopped");
        }
        self.state = RpmState::Stopped;
    }

    pub fn state(&self) -> RpmState {
        self.state
    }

    pub fn last_reading(&self) -> Option<RpmReading> {
        self.core.last_reading()
    }

    /// Pulses counted since the last tick
    ///
    /// Stable once [`shutdown`](Self::shutdown) has returned, since no edge or
    /// tick can run after that.
    pub fn pending_pulses(&self) -> u32 {
        self.core.pulse_counter().peek()
    }

    /// Shared handle for fault checks from another context
    pub fn health(&self) -> RpmHealth {
        RpmHealth {
            core: Arc::clone(&self.core),
        }
    }

    fn expect_state(&self, expected: RpmState) -> Result<()> {
        if self.state != expected {
            return Err(MonitorError::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            });
        }
        Ok(())
    }
}

impl Drop for RotationRateEstimator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Read-only view of a running estimator
#[derive(Clone)]
pub struct RpmHealth {
    core: Arc<RpmCore>,
}

impl RpmHealth {
    /// Error that stopped the tick path, if any
    pub fn fault(&self) -> Option<String> {
        self.core.fault()
    }

    pub fn last_reading(&self) -> Option<RpmReading> {
        self.core.last_reading()
    }
}
