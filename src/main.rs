use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;

use powertach::acquisition::{AnalogChannel, WaveformSampler, load_capture};
use powertach::config::{CalibrationProfile, MonitorConfig};
use powertach::display::{ConsoleNumericDisplay, ConsoleTextDisplay, StreamTextDisplay, TextDisplay};
use powertach::monitor::{CycleReport, PowerMonitor, ShutdownHandle};
use powertach::output::{OutputFormat, create_formatter};
use powertach::power::{PowerFactorCorrection, ReadingCorrection};
use powertach::rpm::{RotationRateEstimator, ThreadTimer};
use powertach::simulation::{MainsSignal, SimulatedHallSensor, SineChannel};

#[derive(Parser, Debug)]
#[command(name = "powertach")]
#[command(about = "Mains power-quality monitor with pulse-counting tachometer")]
struct Args {
    /// TOML configuration file (overrides the profile)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calibration profile used when no configuration file is given
    #[arg(short, long, value_enum, default_value_t = CalibrationProfile::Offset230)]
    profile: CalibrationProfile,

    /// Replay a stereo WAV capture (left = voltage, right = current)
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Output format for the power readings
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Lcd)]
    format: OutputFormat,

    /// Stop after this many cycles and print a summary
    #[arg(long)]
    cycles: Option<usize>,

    /// Voltage channel scale factor (counts to volts)
    #[arg(long)]
    pt_scale: Option<f64>,

    /// Current channel scale factor (counts to amps)
    #[arg(long)]
    ct_scale: Option<f64>,

    /// Apparent power offset
    #[arg(long)]
    offset: Option<f64>,

    /// Power factor correction hook
    #[arg(long, value_enum)]
    pf_correction: Option<PowerFactorCorrection>,

    /// Display-side reading correction hook
    #[arg(long, value_enum)]
    reading_correction: Option<ReadingCorrection>,

    /// RPM per pulse counted in one timer period
    #[arg(long)]
    rpm_multiplier: Option<u32>,

    /// Moving average window in timer ticks
    #[arg(long)]
    window: Option<usize>,

    /// Timer period in milliseconds
    #[arg(long)]
    timer_ms: Option<u64>,

    /// Simulated Hall sensor pulse rate in Hz
    #[arg(long, default_value_t = 10.0)]
    pulse_hz: f64,

    /// Simulated current lag behind voltage in degrees
    #[arg(long, default_value_t = 30.0)]
    lag: f64,

    /// Simulated ADC noise deviation in counts
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Seed for the simulated noise
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    log::info!(
        "Calibration: PT {} CT {} offset {} pf hook {:?} reading hook {:?}",
        config.calibration.pt_scale_factor,
        config.calibration.ct_scale_factor,
        config.calibration.apparent_power_offset,
        config.calibration.power_factor_correction,
        config.calibration.reading_correction
    );

    let (voltage, current) = open_channels(&args, &config)?;
    let sampler = WaveformSampler::new(voltage, current, &config.sampling, &config.calibration)
        .context("Failed to configure ADC channels")?;

    let mut rpm = RotationRateEstimator::new(
        &config.rpm,
        config.display.digit_width,
        Box::new(ConsoleNumericDisplay::new()),
    )
    .context("Failed to create RPM estimator")?;
    let sensor = SimulatedHallSensor::new(args.pulse_hz).context("Invalid pulse rate")?;
    rpm.start(Box::new(sensor), Box::new(ThreadTimer::new("rpm-timer")))
        .context("Failed to start RPM estimator")?;

    let text_display: Box<dyn TextDisplay> = match args.format {
        OutputFormat::Lcd => Box::new(ConsoleTextDisplay::stdout()),
        OutputFormat::Json | OutputFormat::Csv => Box::new(StreamTextDisplay::stdout()),
    };
    let formatter = create_formatter(args.format, config.display.layout);
    let mut monitor =
        PowerMonitor::new(sampler, formatter, text_display, &config).with_rpm_health(rpm.health());

    let result = match args.cycles {
        Some(n) => monitor.run_for(n).map(|summary| {
            print_summary(&summary.reports, summary.failed_cycles);
        }),
        None => monitor.run(&ShutdownHandle::new()),
    };

    if let Some(reading) = rpm.last_reading() {
        log::info!("Last RPM reading: {} (raw {})", reading.smoothed_rpm, reading.raw_rpm);
    }
    rpm.shutdown();

    result.context("Monitor stopped")
}

fn build_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = match args.config {
        Some(ref path) => MonitorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            log::info!("Using calibration profile {}", args.profile);
            MonitorConfig::from_profile(args.profile)
        }
    };

    if let Some(pt) = args.pt_scale {
        config.calibration.pt_scale_factor = pt;
    }
    if let Some(ct) = args.ct_scale {
        config.calibration.ct_scale_factor = ct;
    }
    if let Some(offset) = args.offset {
        config.calibration.apparent_power_offset = offset;
    }
    if let Some(hook) = args.pf_correction {
        config.calibration.power_factor_correction = hook;
    }
    if let Some(hook) = args.reading_correction {
        config.calibration.reading_correction = hook;
    }
    if let Some(multiplier) = args.rpm_multiplier {
        config.rpm.rpm_multiplier = multiplier;
    }
    if let Some(window) = args.window {
        config.rpm.moving_average_window = window;
    }
    if let Some(ms) = args.timer_ms {
        config.rpm.timer_interval_ms = ms;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_channels(
    args: &Args,
    config: &MonitorConfig,
) -> Result<(Box<dyn AnalogChannel>, Box<dyn AnalogChannel>)> {
    if let Some(ref path) = args.capture {
        let (v, i) = load_capture(path, true)
            .with_context(|| format!("Failed to open capture {}", path.display()))?;
        return Ok((Box::new(v), Box::new(i)));
    }

    let interval = config.sampling.sample_interval_us;
    let voltage_signal = MainsSignal::default();
    let current_signal = voltage_signal.lagging(args.lag).with_amplitude(900.0);

    let mut voltage = SineChannel::new(voltage_signal, interval);
    let mut current = SineChannel::new(current_signal, interval);
    if args.noise > 0.0 {
        voltage = voltage
            .with_noise(args.noise, args.seed)
            .context("Invalid noise level")?;
        current = current
            .with_noise(args.noise, args.seed.map(|s| s.wrapping_add(1)))
            .context("Invalid noise level")?;
    }
    Ok((Box::new(voltage), Box::new(current)))
}

fn print_summary(reports: &[CycleReport], failed: usize) {
    let mut vrms: Stats<f64> = Stats::new();
    let mut irms: Stats<f64> = Stats::new();
    let mut real: Stats<f64> = Stats::new();
    let mut pf: Stats<f64> = Stats::new();
    let mut degraded = 0;

    for report in reports {
        vrms.update(report.estimate.vrms);
        irms.update(report.estimate.irms);
        real.update(report.estimate.real_power);
        pf.update(report.estimate.power_factor);
        if report.degraded {
            degraded += 1;
        }
    }

    eprintln!();
    eprintln!("=== Summary ===");
    eprintln!(
        "Cycles: {} ok, {} failed, {} degraded",
        reports.len(),
        failed,
        degraded
    );
    if reports.is_empty() {
        return;
    }
    for (name, stats) in [("Vrms", &vrms), ("Irms", &irms), ("Real P", &real), ("PF", &pf)] {
        eprintln!(
            "{:<7} mean {:>9.3}  std {:>8.3}  min {:>9.3}  max {:>9.3}",
            name, stats.mean, stats.std_dev, stats.min, stats.max
        );
    }
}
