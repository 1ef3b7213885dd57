use anyhow::{Context, Result};
use clap::Parser;
use powertach::save_capture;
use powertach::simulation::{
    AdditiveNoiseConfig, CaptureConfig, ImpulseNoiseConfig, NoiseConfig, generate_capture,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_capture")]
#[command(about = "Generate synthetic two-channel ADC captures for replay")]
struct Args {
    /// TOML capture configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Current lag in degrees: comma-separated (e.g., "0,30,60") or range (e.g., "0-90:15")
    #[arg(short, long, default_value = "0-90:15")]
    lags: String,

    /// Number of trials per lag
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Samples per channel
    #[arg(long)]
    sample_count: Option<usize>,

    /// Sample interval in microseconds
    #[arg(long)]
    sample_interval_us: Option<u64>,

    /// Current amplitude in counts
    #[arg(long)]
    current_amplitude: Option<f64>,

    /// Output filename prefix
    #[arg(long, default_value = "capture")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f64>,

    /// Impulse noise rate in Hz (CLI override)
    #[arg(long)]
    impulse_rate: Option<f64>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    lag_deg: f64,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: u32,
    sample_count: usize,
    files: Vec<ManifestEntry>,
}

fn parse_lags(s: &str) -> Result<Vec<f64>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f64 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f64 = range_parts[0].parse().context("Invalid start value")?;
        let end: f64 = range_parts[1].parse().context("Invalid end value")?;

        let mut lags = Vec::new();
        let mut lag = start;
        while lag <= end {
            lags.push(lag);
            lag += step;
        }
        Ok(lags)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f64>().context("Invalid lag value"))
            .collect()
    }
}

fn load_toml_config(path: &PathBuf) -> Result<CaptureConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(base: &NoiseConfig, args: &Args, seed: u64) -> NoiseConfig {
    let mut config = NoiseConfig {
        seed: Some(seed),
        ..base.clone()
    };

    if let Some(snr) = args.snr {
        config.additive = Some(AdditiveNoiseConfig { snr_db: snr });
    }

    if let Some(impulse_rate) = args.impulse_rate {
        config.impulse = Some(ImpulseNoiseConfig {
            rate_hz: impulse_rate,
            amplitude: 400.0,
            duration_samples: 3,
        });
    }

    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let mut base = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => CaptureConfig::default(),
    };
    if let Some(count) = args.sample_count {
        base.sample_count = count;
    }
    if let Some(interval) = args.sample_interval_us {
        base.sample_interval_us = interval;
    }
    if let Some(amplitude) = args.current_amplitude {
        base.current.amplitude_counts = amplitude;
    }
    if base.sample_interval_us == 0 {
        anyhow::bail!("Sample interval must be positive");
    }
    let sample_rate = (1_000_000 / base.sample_interval_us) as u32;

    let lags = parse_lags(&args.lags)?;
    let base_seed = args.seed.unwrap_or(0);

    let mut manifest_entries = Vec::new();
    let total_files = lags.len() * args.trials as usize;
    let mut file_count = 0;

    for &lag in &lags {
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + lag as u64;
            let config = CaptureConfig {
                current: base.voltage.lagging(lag).with_amplitude(base.current.amplitude_counts),
                noise: build_noise_config(&base.noise, &args, seed),
                ..base.clone()
            };

            let (voltage, current) = generate_capture(&config);

            let filename = format!("{}_lag{:03}_t{:02}.wav", args.prefix, lag as i32, trial);
            let filepath = args.output_dir.join(&filename);
            let filepath = filepath
                .to_str()
                .context("Output path is not valid UTF-8")?;

            save_capture(filepath, &voltage, &current, sample_rate)
                .context("Failed to write WAV file")?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                lag_deg: lag,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate,
            sample_count: base.sample_count,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
