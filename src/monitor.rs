use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::acquisition::WaveformSampler;
use crate::config::MonitorConfig;
use crate::display::TextDisplay;
use crate::error::{MonitorError, Result};
use crate::output::Formatter;
use crate::power::{PowerEstimate, PowerEstimator, ReadingCorrection};
use crate::rpm::RpmHealth;

/// Outcome of one acquire, estimate and render pass
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub cycle: u64,
    /// Estimate as computed, zeroed if estimation failed
    pub estimate: PowerEstimate,
    /// Values sent to the display after the reading correction
    pub shown: PowerEstimate,
    /// Estimation failed and the zero estimate was shown
    pub degraded: bool,
    pub elapsed: Duration,
}

/// Result of a bounded run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<CycleReport>,
    pub failed_cycles: usize,
}

/// Cooperative stop flag for [`PowerMonitor::run`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// Foreground power-quality loop
///
/// Every cycle acquires one window from both channels, estimates power
/// figures and rewrites the text display. A failing cycle is logged and the
/// next one starts; only a fault on the RPM path stops the loop.
pub struct PowerMonitor {
    sampler: WaveformSampler,
    estimator: PowerEstimator,
    reading_correction: ReadingCorrection,
    formatter: Box<dyn Formatter>,
    display: Box<dyn TextDisplay>,
    cycle_pause: Duration,
    rpm_health: Option<RpmHealth>,
    header_pending: bool,
    cycles: u64,
}

impl PowerMonitor {
    pub fn new(
        sampler: WaveformSampler,
        formatter: Box<dyn Formatter>,
        display: Box<dyn TextDisplay>,
        config: &MonitorConfig,
    ) -> Self {
        let estimator = PowerEstimator::new(&config.calibration);
        let header_pending = formatter.header().is_some();
        Self {
            sampler,
            estimator,
            reading_correction: config.calibration.reading_correction,
            formatter,
            display,
            cycle_pause: Duration::from_millis(config.sampling.cycle_pause_ms),
            rpm_health: None,
            header_pending,
            cycles: 0,
        }
    }

    /// Stop the loop when the RPM estimator reports a fault
    pub fn with_rpm_health(mut self, health: RpmHealth) -> Self {
        self.rpm_health = Some(health);
        self
    }

    /// Run one cycle without pausing afterwards
    ///
    /// Acquisition and display errors are returned. Estimation errors are
    /// not: the cycle shows an all-zero reading and reports `degraded`.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let started = Instant::now();
        self.cycles += 1;

        let (voltage, current) = self.sampler.acquire_cycle()?;
        let (estimate, degraded) = match self.estimator.estimate(voltage.as_slice(), current.as_slice()) {
            Ok(estimate) => (estimate, false),
            Err(e) => {
                log::error!("Cycle {}: power estimation failed: {}", self.cycles, e);
                (PowerEstimate::zeroed(), true)
            }
        };
        let shown = self.reading_correction.apply(&estimate);

        if self.header_pending
            && let Some(header) = self.formatter.header()
        {
            self.display.write(header)?;
            self.header_pending = false;
        }

        let text = self.formatter.format(&shown);
        self.display.clear()?;
        self.display.write(&text)?;

        log::debug!(
            "Cycle {}: Vrms {:.2} Irms {:.3} P {:.1} S {:.1} PF {:.3} phase {:.1}",
            self.cycles,
            estimate.vrms,
            estimate.irms,
            estimate.real_power,
            estimate.apparent_power,
            estimate.power_factor,
            estimate.phase_difference_deg
        );

        Ok(CycleReport {
            cycle: self.cycles,
            estimate,
            shown,
            degraded,
            elapsed: started.elapsed(),
        })
    }

    /// Loop until `shutdown` is requested or the RPM path faults
    pub fn run(&mut self, shutdown: &ShutdownHandle) -> Result<()> {
        while !shutdown.is_requested() {
            self.check_rpm()?;
            self.step();
        }
        log::info!("Power monitor stopped after {} cycles", self.cycles);
        Ok(())
    }

    /// Run exactly `cycles` cycles, pausing between them
    pub fn run_for(&mut self, cycles: usize) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..cycles {
            self.check_rpm()?;
            match self.step() {
                Some(report) => summary.reports.push(report),
                None => summary.failed_cycles += 1,
            }
        }
        Ok(summary)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn step(&mut self) -> Option<CycleReport> {
        match self.run_cycle() {
            Ok(report) => {
                if !self.cycle_pause.is_zero() {
                    std::thread::sleep(self.cycle_pause);
                }
                Some(report)
            }
            Err(e) => {
                log::error!("Cycle {} failed: {}", self.cycles, e);
                None
            }
        }
    }

    fn check_rpm(&self) -> Result<()> {
        if let Some(fault) = self.rpm_health.as_ref().and_then(|h| h.fault()) {
            return Err(MonitorError::Timer(format!("RPM estimator stopped: {}", fault)));
        }
        Ok(())
    }
}
