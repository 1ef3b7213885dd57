use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

use crate::error::{MonitorError, Result};

/// Called once per qualifying rising edge; must return quickly
pub type EdgeHandler = Arc<dyn Fn() + Send + Sync>;

/// Called once per timer period; an error stops the timer
pub type TickHandler = Box<dyn FnMut() -> Result<()> + Send>;

/// Input bias of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Digital input that can raise a callback on rising edges
pub trait EdgeInput: Send {
    /// Configure the pin bias and install `handler` for rising edges
    fn attach_rising(&mut self, pull: Pull, handler: EdgeHandler) -> Result<()>;

    /// Remove the handler; no callback runs after this returns
    fn detach(&mut self);
}

/// Repeating timer
pub trait PeriodicTimer: Send {
    /// Run `handler` every `period` until cancelled
    fn start(&mut self, period: Duration, handler: TickHandler) -> Result<()>;

    /// Stop the timer; no callback runs after this returns
    fn cancel(&mut self);
}

/// Periodic timer backed by a worker thread
///
/// Ticks come from a `crossbeam_channel::tick` channel. Cancelling sends on
/// a side channel and joins the worker.
pub struct ThreadTimer {
    name: String,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cancel_tx: None,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl PeriodicTimer for ThreadTimer {
    fn start(&mut self, period: Duration, mut handler: TickHandler) -> Result<()> {
        if self.worker.is_some() {
            return Err(MonitorError::Timer(format!("{} already started", self.name)));
        }
        if period.is_zero() {
            return Err(MonitorError::Timer("period must be positive".into()));
        }

        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let ticker = tick(period);
        let name = self.name.clone();

        let worker = std::thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                loop {
                    select! {
                        recv(cancel_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if let Err(e) = handler() {
                                log::error!("{}: tick handler failed, stopping: {}", name, e);
                                break;
                            }
                        }
                    }
                }
                log::debug!("{} stopped", name);
            })?;

        self.cancel_tx = Some(cancel_tx);
        self.worker = Some(worker);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("{}: worker panicked", self.name);
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_thread_timer_ticks_until_cancelled() {
        let count = Arc::new(AtomicU32::new(0));
        let mut timer = ThreadTimer::new("test-timer");

        let c = Arc::clone(&count);
        timer
            .start(
                Duration::from_millis(5),
                Box::new(move || -> Result<()> {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        std::thread::sleep(Duration::from_millis(100));
        timer.cancel();
        let after_cancel = count.load(Ordering::SeqCst);
        assert!(after_cancel >= 2, "expected several ticks, got {}", after_cancel);

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_thread_timer_stops_on_handler_error() {
        let count = Arc::new(AtomicU32::new(0));
        let mut timer = ThreadTimer::new("failing-timer");

        let c = Arc::clone(&count);
        timer
            .start(
                Duration::from_millis(2),
                Box::new(move || -> Result<()> {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(MonitorError::Display("bus write failed".into()))
                }),
            )
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
        timer.cancel();
    }

    #[test]
    fn test_thread_timer_rejects_double_start() {
        let mut timer = ThreadTimer::new("double");
        timer
            .start(Duration::from_millis(50), Box::new(|| -> Result<()> { Ok(()) }))
            .unwrap();
        assert!(matches!(
            timer.start(Duration::from_millis(50), Box::new(|| -> Result<()> { Ok(()) })),
            Err(MonitorError::Timer(_))
        ));
    }
}
