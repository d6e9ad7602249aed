use bcicore::Sample;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating a synthetic capture stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate_hz: f64,
    pub frequency_hz: f64,
    pub amplitude: f64,
    pub noise: f64,
    pub samples: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 128.0,
            frequency_hz: 4.0,
            amplitude: 1.0,
            noise: 0.02,
            samples: 512,
            seed: 0,
        }
    }
}

/// Builds a seeded sine-plus-jitter sample stream at fixed spacing.
pub fn build_signal(config: &GeneratorConfig) -> anyhow::Result<Vec<Sample>> {
    if !(config.sample_rate_hz.is_finite() && config.sample_rate_hz > 0.0) {
        anyhow::bail!("generator sample rate must be positive");
    }
    if !config.noise.is_finite() {
        anyhow::bail!("generator noise must be finite");
    }
    let noise = config.noise.abs();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut samples = Vec::with_capacity(config.samples);

    for index in 0..config.samples {
        let t = index as f64 / config.sample_rate_hz;
        let base = config.amplitude * (2.0 * PI * config.frequency_hz * t).sin();
        let jitter = if noise > 0.0 {
            rng.gen_range(-noise..noise)
        } else {
            0.0
        };
        samples.push(Sample::new(t, base + jitter));
    }

    Ok(samples)
}
