//! Reporting utilities: residuals and formatted terminal output.

use crate::domain::{FittedModel, PointResidual, SampleSet};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Compute fitted values and residuals for each sample point.
pub fn compute_residuals(samples: &SampleSet, fit: &FittedModel) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::with_capacity(samples.len());
    for (x, y_obs) in samples.iter() {
        let y_fit = fit.evaluate(x);
        if !y_fit.is_finite() {
            return Err(AppError::new(
                4,
                format!("Non-finite {} prediction at x={x} during residual computation.", fit.kind.id()),
            ));
        }
        out.push(PointResidual {
            x,
            y_obs,
            y_fit,
            residual: y_obs - y_fit,
        });
    }
    Ok(out)
}

/// Residual with the largest magnitude, if any.
pub fn largest_residual(residuals: &[PointResidual]) -> Option<&PointResidual> {
    residuals
        .iter()
        .max_by(|a, b| a.residual.abs().total_cmp(&b.residual.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn line(a: f64, b: f64) -> FittedModel {
        FittedModel {
            kind: ModelKind::Linear,
            coefficients: vec![a, b],
            r2: 1.0,
        }
    }

    #[test]
    fn compute_residuals_basic() {
        let samples = SampleSet::new(vec![1.0, 2.0], vec![3.0, 6.0]).unwrap();
        let residuals = compute_residuals(&samples, &line(1.0, 2.0)).unwrap();
        assert_eq!(residuals.len(), 2);
        assert!((residuals[0].residual - 0.0).abs() < 1e-12);
        assert!((residuals[1].y_fit - 5.0).abs() < 1e-12);
        assert!((residuals[1].residual - 1.0).abs() < 1e-12);
    }

    #[test]
    fn compute_residuals_rejects_non_finite_prediction() {
        let samples = SampleSet::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let fit = FittedModel {
            kind: ModelKind::Hyperbolic,
            coefficients: vec![1.0, 1.0],
            r2: 1.0,
        };
        let err = compute_residuals(&samples, &fit).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn largest_residual_uses_magnitude() {
        let samples = SampleSet::new(vec![1.0, 2.0, 3.0], vec![3.5, 4.0, 8.0]).unwrap();
        let residuals = compute_residuals(&samples, &line(1.0, 2.0)).unwrap();
        // residuals: 0.5, -1.0, 1.0
        let worst = largest_residual(&residuals).unwrap();
        assert!((worst.residual.abs() - 1.0).abs() < 1e-12);
        assert!(largest_residual(&[]).is_none());
    }
}
