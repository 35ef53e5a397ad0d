//! Synthetic sample generation from a known model plus Gaussian noise.
//!
//! Used by `curvefit generate` and the TUI demo data set. Generation is fully
//! determined by the seed, so runs are reproducible.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use log::debug;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ModelKind, SampleSet};
use crate::error::AppError;
use crate::models::predict;

/// How noise is applied to the model value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoiseMode {
    /// `y = f(x) + σ z`
    Absolute,
    /// `y = f(x) (1 + σ z)`; keeps the sign of `f(x)` for small σ.
    Relative,
}

/// Parameters for one synthetic data set.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub kind: ModelKind,
    /// Coefficients in `kind.coefficient_names()` order.
    pub coefficients: Vec<f64>,
    pub count: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub noise: f64,
    pub noise_mode: NoiseMode,
    pub seed: u64,
}

impl GeneratorConfig {
    /// A gently noisy exponential that every positive-domain model can fit.
    pub fn demo(seed: u64) -> Self {
        Self {
            kind: ModelKind::Exponential,
            coefficients: vec![2.0, 0.3],
            count: 40,
            x_min: 0.5,
            x_max: 10.0,
            noise: 0.05,
            noise_mode: NoiseMode::Relative,
            seed,
        }
    }
}

/// Draw `count` points with x uniform in `[x_min, x_max]` (sorted ascending).
pub fn generate_samples(config: &GeneratorConfig) -> Result<SampleSet, AppError> {
    if config.coefficients.len() != config.kind.coefficient_len() {
        return Err(AppError::new(
            2,
            format!(
                "{} model takes {} coefficients ({}), got {}.",
                config.kind.display_name(),
                config.kind.coefficient_len(),
                config.kind.coefficient_names().join(", "),
                config.coefficients.len()
            ),
        ));
    }
    if config.count < 2 {
        return Err(AppError::new(2, "Sample count must be >= 2."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid x range for sample generation."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise level must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut x: Vec<f64> = (0..config.count)
        .map(|_| rng.gen_range(config.x_min..=config.x_max))
        .collect();
    x.sort_by(f64::total_cmp);

    let mut y = Vec::with_capacity(config.count);
    for &xi in &x {
        let base = predict(config.kind, xi, &config.coefficients);
        if !base.is_finite() {
            return Err(AppError::new(
                4,
                format!("{} model is not finite at x={xi}; adjust the x range.", config.kind.display_name()),
            ));
        }
        let z = normal.sample(&mut rng);
        let yi = match config.noise_mode {
            NoiseMode::Absolute => base + config.noise * z,
            NoiseMode::Relative => base * (1.0 + config.noise * z),
        };
        y.push(yi);
    }

    debug!(
        "generated {} {} samples (seed={}, noise={} {:?})",
        config.count,
        config.kind.id(),
        config.seed,
        config.noise,
        config.noise_mode
    );

    Ok(SampleSet::new(x, y)?)
}

/// Write samples as an `x,y` CSV file readable by `--file`.
pub fn write_samples_csv(path: &Path, samples: &SampleSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_samples(file, samples)
}

/// Write samples as `x,y` CSV to any writer.
pub fn write_samples<W: Write>(mut out: W, samples: &SampleSet) -> Result<(), AppError> {
    writeln!(out, "x,y").map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    for (x, y) in samples.iter() {
        writeln!(out, "{x},{y}").map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV output: {e}")))
}
