//! Hand-driven doubles for the hardware traits
//!
//! Each double hands out a cloneable trigger or history handle before it is
//! boxed, so a test keeps control after the double moves into the code
//! under test.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::acquisition::AnalogChannel;
use crate::config::Attenuation;
use crate::display::{NumericDisplay, TextDisplay};
use crate::error::{MonitorError, Result};
use crate::rpm::{EdgeHandler, EdgeInput, PeriodicTimer, Pull, TickHandler};

/// ADC channel that returns a fixed list of counts
pub struct ScriptedChannel {
    counts: Vec<u16>,
    position: usize,
    looping: bool,
    rejected: Option<Attenuation>,
    configured: Option<Attenuation>,
}

impl ScriptedChannel {
    /// Repeats `counts` forever
    pub fn new(counts: Vec<u16>) -> Self {
        Self {
            counts,
            position: 0,
            looping: true,
            rejected: None,
            configured: None,
        }
    }

    /// Fail reads once the list is exhausted instead of wrapping
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Fail `configure` for this attenuation
    pub fn rejecting(mut self, attenuation: Attenuation) -> Self {
        self.rejected = Some(attenuation);
        self
    }

    pub fn configured(&self) -> Option<Attenuation> {
        self.configured
    }
}

impl AnalogChannel for ScriptedChannel {
    fn configure(&mut self, attenuation: Attenuation) -> Result<()> {
        if self.rejected == Some(attenuation) {
            return Err(MonitorError::Adc(format!(
                "attenuation {} not supported",
                attenuation
            )));
        }
        self.configured = Some(attenuation);
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16> {
        if self.position >= self.counts.len() {
            if !self.looping || self.counts.is_empty() {
                return Err(MonitorError::Adc("script exhausted".into()));
            }
            self.position = 0;
        }
        let count = self.counts[self.position];
        self.position += 1;
        Ok(count)
    }
}

#[derive(Default)]
struct EdgeState {
    handler: Option<EdgeHandler>,
    pull: Option<Pull>,
}

/// Edge input whose edges are raised by the test
#[derive(Default)]
pub struct ManualEdgeInput {
    state: Arc<Mutex<EdgeState>>,
}

impl ManualEdgeInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> EdgeTrigger {
        EdgeTrigger {
            state: Arc::clone(&self.state),
        }
    }
}

impl EdgeInput for ManualEdgeInput {
    fn attach_rising(&mut self, pull: Pull, handler: EdgeHandler) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.handler = Some(handler);
        state.pull = Some(pull);
        Ok(())
    }

    fn detach(&mut self) {
        self.state.lock().unwrap().handler = None;
    }
}

/// Raises edges on a [`ManualEdgeInput`]; cloneable across threads
#[derive(Clone)]
pub struct EdgeTrigger {
    state: Arc<Mutex<EdgeState>>,
}

impl EdgeTrigger {
    /// Raise one edge; returns false if no handler is attached
    pub fn fire(&self) -> bool {
        let handler = self.state.lock().unwrap().handler.clone();
        match handler {
            Some(h) => {
                h();
                true
            }
            None => false,
        }
    }

    pub fn fire_n(&self, n: usize) {
        for _ in 0..n {
            self.fire();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().unwrap().handler.is_some()
    }

    pub fn pull(&self) -> Option<Pull> {
        self.state.lock().unwrap().pull
    }
}

/// Edge input that cannot attach
pub struct FailingEdgeInput;

impl EdgeInput for FailingEdgeInput {
    fn attach_rising(&mut self, _pull: Pull, _handler: EdgeHandler) -> Result<()> {
        Err(MonitorError::Interrupt("pin does not support edge interrupts".into()))
    }

    fn detach(&mut self) {}
}

#[derive(Default)]
struct TimerState {
    handler: Option<TickHandler>,
    period: Option<Duration>,
}

/// Periodic timer whose ticks are raised by the test
#[derive(Default)]
pub struct ManualTimer {
    state: Arc<Mutex<TimerState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> TimerTrigger {
        TimerTrigger {
            state: Arc::clone(&self.state),
        }
    }
}

impl PeriodicTimer for ManualTimer {
    fn start(&mut self, period: Duration, handler: TickHandler) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.handler.is_some() {
            return Err(MonitorError::Timer("already started".into()));
        }
        state.handler = Some(handler);
        state.period = Some(period);
        Ok(())
    }

    fn cancel(&mut self) {
        self.state.lock().unwrap().handler = None;
    }
}

/// Raises ticks on a [`ManualTimer`]
#[derive(Clone)]
pub struct TimerTrigger {
    state: Arc<Mutex<TimerState>>,
}

impl TimerTrigger {
    /// Run the tick handler once
    ///
    /// Errors if the timer is not running. A handler error stops the timer,
    /// matching [`ThreadTimer`](crate::rpm::ThreadTimer).
    pub fn fire(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let handler = state
            .handler
            .as_mut()
            .ok_or_else(|| MonitorError::Timer("timer not running".into()))?;
        let result = handler();
        if result.is_err() {
            state.handler = None;
        }
        result
    }

    pub fn period(&self) -> Option<Duration> {
        self.state.lock().unwrap().period
    }
}

/// Shared list of everything a recording display was asked to show
pub type History = Arc<Mutex<Vec<String>>>;

/// Numeric display that records each value
#[derive(Default)]
pub struct RecordingNumericDisplay {
    history: History,
    fail_after: Option<usize>,
}

impl RecordingNumericDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` values, then fail every `show`
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn history(&self) -> History {
        Arc::clone(&self.history)
    }
}

impl NumericDisplay for RecordingNumericDisplay {
    fn show(&mut self, digits: &str) -> Result<()> {
        let mut history = self.history.lock().unwrap();
        if self.fail_after.is_some_and(|n| history.len() >= n) {
            return Err(MonitorError::Display("segment bus write failed".into()));
        }
        history.push(digits.to_string());
        Ok(())
    }
}

/// Character display that records each full write
#[derive(Default)]
pub struct RecordingTextDisplay {
    history: History,
    clears: Arc<Mutex<usize>>,
    fail_after: Option<usize>,
}

impl RecordingTextDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `n` writes, then fail every `write`
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn history(&self) -> History {
        Arc::clone(&self.history)
    }

    pub fn clear_count(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.clears)
    }
}

impl TextDisplay for RecordingTextDisplay {
    fn clear(&mut self) -> Result<()> {
        *self.clears.lock().unwrap() += 1;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        let mut history = self.history.lock().unwrap();
        if self.fail_after.is_some_and(|n| history.len() >= n) {
            return Err(MonitorError::Display("i2c write failed".into()));
        }
        history.push(text.to_string());
        Ok(())
    }
}
