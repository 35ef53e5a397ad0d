//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! The four caller-facing operations live here:
//!
//! - `fit_one`: fit a single kind
//! - `fit_all`: fit and rank every kind
//! - `list_model_kinds`: the kinds (plus the virtual "all") with labels
//! - `sample_curve`: dense `(x, ŷ)` points for plotting
//!
//! Each validates caller input before any numeric work. `run_fit` strings them
//! together for a front-end: comparison -> chosen model -> residuals -> curves.

use log::info;

use crate::domain::{
    ComparisonResult, CurveOutput, FitConfig, FittedModel, MIN_POINTS, ModelKind, ModelSpec, PointResidual,
    SampleSet,
};
use crate::error::{AppError, FitError};

/// Fit one model kind to paired x/y values (at least two points).
pub fn fit_one(x: &[f64], y: &[f64], kind: ModelKind) -> Result<FittedModel, FitError> {
    let samples = SampleSet::new(x.to_vec(), y.to_vec())?;
    crate::fit::fit_model(kind, &samples)
}

/// Fit every model kind and rank the successes by R².
///
/// Only pairing is required here; kinds that need more data fail individually.
pub fn fit_all(x: &[f64], y: &[f64]) -> Result<ComparisonResult, FitError> {
    let samples = SampleSet::with_min_points(x.to_vec(), y.to_vec(), 1)?;
    Ok(crate::fit::fit_all(&samples))
}

/// The fit kinds in attempt order, followed by the virtual "all" kind.
pub fn list_model_kinds() -> Vec<(ModelSpec, &'static str)> {
    ModelKind::ALL
        .iter()
        .map(|&k| ModelSpec::from(k))
        .chain(std::iter::once(ModelSpec::All))
        .map(|spec| (spec, spec.display_name()))
        .collect()
}

/// Sample the fitted curve for `spec` (or every kind that fits) on `num_points` x values.
///
/// A single kind needs the same two points as `fit_one`; `ModelSpec::All`
/// accepts one point and simply yields no curves.
pub fn sample_curve(
    x: &[f64],
    y: &[f64],
    spec: ModelSpec,
    num_points: usize,
    x_range: Option<(f64, f64)>,
) -> Result<CurveOutput, FitError> {
    let samples = SampleSet::with_min_points(x.to_vec(), y.to_vec(), min_points_for(spec))?;
    crate::fit::sample_curve(&samples, spec, num_points, x_range)
}

fn min_points_for(spec: ModelSpec) -> usize {
    match spec.kind() {
        Some(_) => MIN_POINTS,
        None => 1,
    }
}

/// All computed outputs of a single `curvefit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: SampleSet,
    pub comparison: ComparisonResult,
    /// The requested kind, or the best-ranked one for `ModelSpec::All`.
    pub chosen: Option<FittedModel>,
    pub residuals: Vec<PointResidual>,
    pub curves: CurveOutput,
}

/// Execute the full fitting pipeline on an already-validated sample set.
///
/// A single requested kind is held to the `fit_one` point minimum even when
/// the samples were built with a lower one.
pub fn run_fit(samples: SampleSet, config: &FitConfig) -> Result<RunOutput, AppError> {
    let min_points = min_points_for(config.model_spec);
    if samples.len() < min_points {
        return Err(FitError::validation(format!(
            "at least {min_points} points are required (got {})",
            samples.len()
        ))
        .into());
    }

    info!(
        "fitting {} points (model={}, points={})",
        samples.len(),
        config.model_spec.id(),
        config.num_points
    );

    let comparison = crate::fit::fit_all(&samples);

    let chosen = match config.model_spec.kind() {
        // A single requested kind must fit; surface its failure.
        Some(kind) => Some(crate::fit::fit_model(kind, &samples)?),
        None => comparison.best_fit().cloned(),
    };

    let residuals = match &chosen {
        Some(fit) => crate::report::compute_residuals(&samples, fit)?,
        None => Vec::new(),
    };

    let curves = crate::fit::sample_curve(&samples, config.model_spec, config.num_points, config.x_range)?;

    info!(
        "best model: {}",
        comparison.best().map(|k| k.id()).unwrap_or("none")
    );

    Ok(RunOutput {
        samples,
        comparison,
        chosen,
        residuals,
        curves,
    })
}
