//! Low-level fitting routines for a single model kind.
//!
//! Given a validated sample set we:
//! - check the model's domain requirement (fail fast, before any sums)
//! - solve for the coefficients by closed-form least squares, either on the
//!   linearized data or (quadratic) through the 3×3 normal equations
//! - compute R² against the raw observations
//!
//! A fit that succeeds yields an immutable `FittedModel`.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::{FittedModel, ModelKind, ModelSummary, SampleSet};
use crate::error::FitError;
use crate::math::{r_squared, simple_least_squares, solve_linear_system, LineFitFailure};
use crate::models::{check_domain, coefficients_from_line, formula, linearize, predict};

/// Fit a single model kind to the samples.
pub fn fit_model(kind: ModelKind, samples: &SampleSet) -> Result<FittedModel, FitError> {
    check_domain(kind, samples.x(), samples.y())?;

    let coefficients = match kind {
        ModelKind::Quadratic => fit_quadratic(samples)?,
        _ => fit_linearized(kind, samples)?,
    };

    let r2 = r_squared(
        samples.y(),
        samples.x().iter().map(|&x| predict(kind, x, &coefficients)),
    );

    debug!(
        "fitted {} to {} points: coefficients={coefficients:?} r2={r2}",
        kind.id(),
        samples.len()
    );

    Ok(FittedModel {
        kind,
        coefficients,
        r2,
    })
}

fn fit_linearized(kind: ModelKind, samples: &SampleSet) -> Result<Vec<f64>, FitError> {
    let (u, z): (Vec<f64>, Vec<f64>) = samples.iter().map(|(x, y)| linearize(kind, x, y)).unzip();

    let line = simple_least_squares(&u, &z).map_err(|failure| match failure {
        LineFitFailure::ConstantInput => FitError::domain(kind, "x values must not all be equal"),
        LineFitFailure::NonFinite => {
            FitError::domain(kind, "transformed values overflow; coefficients are not finite")
        }
    })?;

    Ok(coefficients_from_line(kind, line))
}

/// Solve the normal equations
///
/// ```text
/// [ n    Σx   Σx² ] [a0]   [ Σy   ]
/// [ Σx   Σx²  Σx³ ] [a1] = [ Σxy  ]
/// [ Σx²  Σx³  Σx⁴ ] [a2]   [ Σx²y ]
/// ```
fn fit_quadratic(samples: &SampleSet) -> Result<Vec<f64>, FitError> {
    let n = samples.len() as f64;

    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for (x, y) in samples.iter() {
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }

    let a = DMatrix::from_row_slice(
        3,
        3,
        &[
            n, sx, sx2, //
            sx, sx2, sx3, //
            sx2, sx3, sx4,
        ],
    );
    let b = DVector::from_row_slice(&[sy, sxy, sx2y]);

    let solution = solve_linear_system(&a, &b).map_err(|err| match err {
        FitError::SingularSystem { .. } => FitError::domain(
            ModelKind::Quadratic,
            "normal equations are singular (need at least 3 distinct x values)",
        ),
        other => other,
    })?;

    Ok(solution.iter().copied().collect())
}

impl FittedModel {
    /// Predicted `y` at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        predict(self.kind, x, &self.coefficients)
    }

    /// R² of this model against an arbitrary sample set.
    pub fn compute_r2(&self, samples: &SampleSet) -> f64 {
        r_squared(samples.y(), samples.x().iter().map(|&x| self.evaluate(x)))
    }

    /// Coefficients keyed by their fixed names (`a`/`b` or `a0`/`a1`/`a2`).
    pub fn named_coefficients(&self) -> BTreeMap<String, f64> {
        self.kind
            .coefficient_names()
            .iter()
            .zip(&self.coefficients)
            .map(|(name, &v)| (name.to_string(), v))
            .collect()
    }

    pub fn formula(&self) -> String {
        formula(self.kind, &self.coefficients)
    }

    pub fn describe(&self) -> ModelSummary {
        ModelSummary {
            kind: self.kind,
            coefficients: self.named_coefficients(),
            r2: self.r2,
            formula: self.formula(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn samples(x: &[f64], f: impl Fn(f64) -> f64) -> SampleSet {
        SampleSet::new(x.to_vec(), x.iter().map(|&v| f(v)).collect()).unwrap()
    }

    #[test]
    fn linear_exact_data_gives_unit_r2() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0, 5.0], |x| 2.0 * x);
        let fit = fit_model(ModelKind::Linear, &s).unwrap();
        assert_abs_diff_eq!(fit.r2, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(fit.evaluate(6.0), 12.0, epsilon = 1e-5);
    }

    #[test]
    fn linear_recovers_intercept_and_slope() {
        let s = samples(&[1.0, 2.0, 3.0], |x| 1.0 + 2.0 * x);
        let fit = fit_model(ModelKind::Linear, &s).unwrap();
        let c = fit.named_coefficients();
        assert_abs_diff_eq!(c["a"], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c["b"], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn linear_noisy_data_r2_in_unit_interval() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.1, 3.9, 6.2, 7.8, 10.1]).unwrap();
        let fit = fit_model(ModelKind::Linear, &s).unwrap();
        assert!(fit.r2 > 0.0 && fit.r2 <= 1.0);
    }

    #[test]
    fn quadratic_recovers_coefficients() {
        let s = samples(&[0.0, 1.0, 2.0, 3.0, 4.0], |x| 1.0 + 2.0 * x + 3.0 * x * x);
        let fit = fit_model(ModelKind::Quadratic, &s).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.coefficients[2], 3.0, epsilon = 1e-6);
        assert!(fit.r2 > 0.99);
    }

    #[test]
    fn quadratic_with_two_distinct_x_is_a_domain_violation() {
        let s = SampleSet::new(vec![1.0, 2.0, 1.0, 2.0], vec![1.0, 2.0, 1.5, 2.5]).unwrap();
        let err = fit_model(ModelKind::Quadratic, &s).unwrap_err();
        assert!(matches!(
            err,
            FitError::DomainViolation { kind: ModelKind::Quadratic, .. }
        ));
    }

    #[test]
    fn exponential_recovers_growth() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0, 5.0], |x| 2.0 * (0.5 * x).exp());
        let fit = fit_model(ModelKind::Exponential, &s).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 0.5, epsilon = 1e-9);
        assert!(fit.r2 > 0.99);
    }

    #[test]
    fn exponential_rejects_non_positive_y() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0], vec![1.0, -2.0, 3.0]).unwrap();
        let err = fit_model(ModelKind::Exponential, &s).unwrap_err();
        assert!(matches!(err, FitError::DomainViolation { .. }));
    }

    #[test]
    fn hyperbolic_recovers_coefficients() {
        let s = samples(&[1.0, 2.0, 4.0, 5.0, 10.0], |x| 5.0 + 10.0 / x);
        let fit = fit_model(ModelKind::Hyperbolic, &s).unwrap();
        let c = fit.named_coefficients();
        assert_abs_diff_eq!(c["a"], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c["b"], 5.0, epsilon = 1e-9);
        assert!(fit.r2 > 0.99);
    }

    #[test]
    fn hyperbolic_rejects_zero_x() {
        let s = SampleSet::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(fit_model(ModelKind::Hyperbolic, &s).is_err());
    }

    #[test]
    fn logarithmic_recovers_coefficients() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0, 5.0], |x| 2.0 + 3.0 * x.ln());
        let fit = fit_model(ModelKind::Logarithmic, &s).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn logarithmic_rejects_non_positive_x() {
        let s = SampleSet::new(vec![-1.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(fit_model(ModelKind::Logarithmic, &s).is_err());
    }

    #[test]
    fn power_recovers_coefficients() {
        let s = samples(&[1.0, 2.0, 3.0, 4.0, 5.0], |x| 2.0 * x.powi(3));
        let fit = fit_model(ModelKind::Power, &s).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficients[1], 3.0, epsilon = 1e-9);
        assert!(fit.r2 > 0.99);
    }

    #[test]
    fn power_rejects_negative_values() {
        let s = SampleSet::new(vec![-1.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(fit_model(ModelKind::Power, &s).is_err());
        let s = SampleSet::new(vec![1.0, 2.0, 3.0], vec![1.0, 0.0, 3.0]).unwrap();
        assert!(fit_model(ModelKind::Power, &s).is_err());
    }

    #[test]
    fn constant_y_gives_nan_r2() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0], vec![4.0, 4.0, 4.0]).unwrap();
        let fit = fit_model(ModelKind::Linear, &s).unwrap();
        assert!(fit.r2.is_nan());
        assert_abs_diff_eq!(fit.evaluate(10.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_x_is_a_domain_violation_for_line_fits() {
        let s = SampleSet::new(vec![2.0, 2.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = fit_model(ModelKind::Linear, &s).unwrap_err();
        assert!(err.to_string().contains("must not all be equal"));
    }

    #[test]
    fn overflow_in_transformed_sums_has_its_own_reason() {
        // 1/x² overflows for x near 1e-200.
        let s = SampleSet::new(vec![1e-200, 2e-200, 1.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = fit_model(ModelKind::Hyperbolic, &s).unwrap_err();
        assert!(matches!(err, FitError::DomainViolation { kind: ModelKind::Hyperbolic, .. }));
        assert!(err.to_string().contains("overflow"));
        assert!(!err.to_string().contains("must not all be equal"));
    }

    #[test]
    fn describe_reports_named_coefficients_and_formula() {
        let s = samples(&[1.0, 2.0, 3.0], |x| 3.0 + 2.0 * x);
        let summary = fit_model(ModelKind::Linear, &s).unwrap().describe();
        assert_eq!(summary.kind, ModelKind::Linear);
        assert_eq!(
            summary.coefficients.keys().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(summary.formula, "y = 3.0000 + 2.0000x");
    }

    #[test]
    fn compute_r2_matches_fit_r2() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0, 4.0], vec![1.2, 1.9, 3.2, 3.9]).unwrap();
        let fit = fit_model(ModelKind::Quadratic, &s).unwrap();
        assert_abs_diff_eq!(fit.compute_r2(&s), fit.r2, epsilon = 1e-12);
    }
}
