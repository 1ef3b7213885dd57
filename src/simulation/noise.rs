use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f64) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_impulse(mut self, rate_hz: f64, amplitude: f64, duration_samples: usize) -> Self {
        self.impulse = Some(ImpulseNoiseConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

/// White Gaussian noise relative to the AC power of the signal
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f64,
}

/// Switching spikes, `amplitude` in counts
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct ImpulseNoiseConfig {
    pub rate_hz: f64,
    pub amplitude: f64,
    pub duration_samples: usize,
}

pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean square deviation from the mean, so the ADC bias does not count
pub fn ac_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    signal.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / signal.len() as f64
}

fn apply_additive_noise(signal: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let power = ac_power(signal);
    if power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f64.powf(config.snr_db / 10.0);
    let noise_std = (power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std) else {
        log::warn!("Invalid noise deviation {}, skipping", noise_std);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
}

fn apply_impulse_noise(
    signal: &mut [f64],
    config: &ImpulseNoiseConfig,
    sample_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between_impulses = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f64>() * 2.0 * avg_samples_between_impulses) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

pub fn apply_noise(clean_signal: &[f64], config: &NoiseConfig, sample_rate: f64) -> Vec<f64> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    if let Some(ref impulse_config) = config.impulse {
        apply_impulse_noise(&mut signal, impulse_config, sample_rate, &mut rng);
    }

    signal
}
