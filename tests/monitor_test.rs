use approx::assert_relative_eq;
use powertach::acquisition::{WaveformSampler, load_capture};
use powertach::config::{CalibrationProfile, LcdLayout, MonitorConfig};
use powertach::monitor::PowerMonitor;
use powertach::output::LcdFormatter;
use powertach::power::estimate_power;
use powertach::rpm::RotationRateEstimator;
use powertach::save_capture;
use powertach::simulation::{CaptureConfig, MainsSignal, SineChannel, generate_capture};
use powertach::test_utils::{
    ManualEdgeInput, ManualTimer, RecordingNumericDisplay, RecordingTextDisplay, ScriptedChannel,
};

fn fast_config(profile: CalibrationProfile) -> MonitorConfig {
    let mut config = MonitorConfig::from_profile(profile);
    config.sampling.cycle_pause_ms = 0;
    config
}

fn sine_sampler(config: &MonitorConfig) -> WaveformSampler {
    // Channels keep their own clock, so the sampler need not sleep
    let mut sampling = config.sampling.clone();
    sampling.sample_interval_us = 0;
    let voltage = MainsSignal::default();
    let current = voltage.lagging(30.0).with_amplitude(900.0);
    WaveformSampler::new(
        Box::new(SineChannel::new(voltage, 100)),
        Box::new(SineChannel::new(current, 100)),
        &sampling,
        &config.calibration,
    )
    .unwrap()
}

#[test]
fn test_simulated_mains_end_to_end() {
    let config = fast_config(CalibrationProfile::Offset230);
    let display = RecordingTextDisplay::new();
    let shown = display.history();
    let mut monitor = PowerMonitor::new(
        sine_sampler(&config),
        Box::new(LcdFormatter::new(config.display.layout)),
        Box::new(display),
        &config,
    );

    let summary = monitor.run_for(2).unwrap();
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.failed_cycles, 0);

    // Biased input: rms^2 = bias^2 + amplitude^2 / 2
    let bias: f64 = 4095.0 / 2.0;
    let expected_vrms = (bias * bias + 1800.0 * 1800.0 / 2.0).sqrt() * 0.218;
    let estimate = summary.reports[0].estimate;
    assert_relative_eq!(estimate.vrms, expected_vrms, max_relative = 0.01);
    assert!(estimate.power_factor >= 0.0 && estimate.power_factor <= 1.0);
    // The ADC bias keeps both channels positive, so no crossings
    assert_eq!(estimate.phase_difference_deg, 0.0);

    let lines = shown.lock().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Vrms: "));
    assert_eq!(lines[0].lines().count(), 4);
}

#[test]
fn test_bench_profile_renders_corrected_summary() {
    let config = fast_config(CalibrationProfile::Bench);
    assert_eq!(config.display.layout, LcdLayout::PowerSummary);
    let display = RecordingTextDisplay::new();
    let shown = display.history();
    let mut monitor = PowerMonitor::new(
        sine_sampler(&config),
        Box::new(LcdFormatter::new(config.display.layout)),
        Box::new(display),
        &config,
    );

    let report = monitor.run_cycle().unwrap();

    assert!(report.shown.irms <= report.estimate.irms + 1.1);
    assert!(report.shown.real_power <= report.estimate.real_power);
    assert!(shown.lock().unwrap()[0].contains(" | S: "));
}

#[test]
fn test_replayed_capture_matches_direct_estimate() {
    let capture = CaptureConfig::default();
    let (voltage, current) = generate_capture(&capture);

    let path = std::env::temp_dir().join(format!("powertach-replay-{}.wav", std::process::id()));
    let path_str = path.to_str().unwrap();
    save_capture(path_str, &voltage, &current, 10_000).unwrap();

    let config = fast_config(CalibrationProfile::Baseline);
    let (v_channel, i_channel) = load_capture(&path, false).unwrap();
    let mut sampling = config.sampling.clone();
    sampling.sample_interval_us = 0;
    let sampler = WaveformSampler::new(
        Box::new(v_channel),
        Box::new(i_channel),
        &sampling,
        &config.calibration,
    )
    .unwrap();
    let mut monitor = PowerMonitor::new(
        sampler,
        Box::new(LcdFormatter::new(LcdLayout::RealPower)),
        Box::new(RecordingTextDisplay::new()),
        &config,
    );

    let replayed = monitor.run_cycle().unwrap().estimate;
    // A non-looping capture of one window cannot fill a second
    assert!(monitor.run_cycle().is_err());
    std::fs::remove_file(&path).unwrap();

    let v: Vec<f64> = voltage.iter().map(|&c| f64::from(c) * 0.218).collect();
    let i: Vec<f64> = current.iter().map(|&c| f64::from(c) * 0.051).collect();
    let direct = estimate_power(&v, &i, 0.0).unwrap();

    assert_relative_eq!(replayed.vrms, direct.vrms, max_relative = 1e-12);
    assert_relative_eq!(replayed.real_power, direct.real_power, max_relative = 1e-12);
    assert_relative_eq!(replayed.power_factor, direct.power_factor, max_relative = 1e-12);
}

#[test]
fn test_rpm_fault_stops_monitor() {
    let config = fast_config(CalibrationProfile::Offset230);
    let timer = ManualTimer::new();
    let ticks = timer.trigger();
    let mut rpm = RotationRateEstimator::new(
        &config.rpm,
        config.display.digit_width,
        Box::new(RecordingNumericDisplay::new().failing_after(0)),
    )
    .unwrap();
    rpm.start(Box::new(ManualEdgeInput::new()), Box::new(timer))
        .unwrap();

    let mut sampling = config.sampling.clone();
    sampling.sample_count = 4;
    sampling.sample_interval_us = 0;
    let sampler = WaveformSampler::new(
        Box::new(ScriptedChannel::new(vec![0])),
        Box::new(ScriptedChannel::new(vec![0])),
        &sampling,
        &config.calibration,
    )
    .unwrap();
    let mut monitor = PowerMonitor::new(
        sampler,
        Box::new(LcdFormatter::new(LcdLayout::RealPower)),
        Box::new(RecordingTextDisplay::new()),
        &config,
    )
    .with_rpm_health(rpm.health());

    assert_eq!(monitor.run_for(1).unwrap().reports.len(), 1);
    assert!(ticks.fire().is_err());
    assert!(monitor.run_for(1).is_err());
}
