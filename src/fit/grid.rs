//! Evenly spaced x grids for curve sampling.

use crate::domain::{CurveSample, FittedModel};
use crate::error::FitError;

/// Generate `steps` evenly spaced points `min + i * (max - min) / (steps - 1)`.
///
/// `min == max` is allowed and yields `steps` copies of that value.
pub fn linear_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FitError> {
    if !(min.is_finite() && max.is_finite() && max >= min) {
        return Err(FitError::validation(format!(
            "invalid x range: min={min}, max={max} (must be finite and max >= min)"
        )));
    }
    if steps < 2 {
        return Err(FitError::validation(format!(
            "number of curve points must be >= 2 (got {steps})"
        )));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + i as f64 * step).collect())
}

/// Evaluate a fitted model on a grid.
///
/// Kinds whose form needs `x > 0` silently drop grid points `<= 0`, so the
/// curve may be shorter than the grid.
pub fn curve_for(fit: &FittedModel, grid: &[f64]) -> CurveSample {
    let skip_non_positive = fit.kind.requires_positive_x_samples();

    let (x, y) = grid
        .iter()
        .copied()
        .filter(|&x| !(skip_non_positive && x <= 0.0))
        .map(|x| (x, fit.evaluate(x)))
        .unzip();

    CurveSample {
        kind: fit.kind,
        x,
        y,
        r2: fit.r2,
    }
}
