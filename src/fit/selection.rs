//! Fit registry: run every model kind, rank by R², sample curves.
//!
//! Every kind is attempted in the fixed order of `ModelKind::ALL`. A kind that
//! fails (domain violation, singular normal equations) is recorded in
//! `skipped` and logged; the remaining kinds still run.
//!
//! Ranking is a stable sort by R² descending, so ties keep attempt order. NaN
//! R² (constant y) ranks after every finite value.

use std::cmp::Ordering;

use log::warn;
use rayon::prelude::*;

use crate::domain::{ComparisonResult, CurveOutput, CurveSample, FittedModel, ModelKind, ModelSpec, SampleSet};
use crate::error::FitError;
use crate::fit::fitter::fit_model;
use crate::fit::grid::{curve_for, linear_space};

/// Fit all six kinds and rank the successes.
pub fn fit_all(samples: &SampleSet) -> ComparisonResult {
    let (mut fits, skipped) = fit_each(samples);
    rank_by_r2(&mut fits);
    ComparisonResult { fits, skipped }
}

/// Attempt every kind (in parallel), keeping attempt order in the output.
fn fit_each(samples: &SampleSet) -> (Vec<FittedModel>, Vec<(ModelKind, String)>) {
    let outcomes: Vec<(ModelKind, Result<FittedModel, FitError>)> = ModelKind::ALL[..]
        .par_iter()
        .map(|&kind| (kind, fit_model(kind, samples)))
        .collect();

    let mut fits = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (kind, outcome) in outcomes {
        match outcome {
            Ok(fit) => fits.push(fit),
            Err(err) => {
                warn!("skipping {} model: {err}", kind.id());
                skipped.push((kind, err.to_string()));
            }
        }
    }
    (fits, skipped)
}

/// Sort fits by R² descending (stable; NaN last).
pub fn rank_by_r2(fits: &mut [FittedModel]) {
    fits.sort_by(|a, b| r2_rank_order(a.r2, b.r2));
}

fn r2_rank_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Densely sample the fitted curve(s) for plotting.
///
/// The grid spans the sample x range unless `x_range` overrides it. For a
/// single kind a fit failure is returned; for `ModelSpec::All` failing kinds
/// are left out of the output.
pub fn sample_curve(
    samples: &SampleSet,
    spec: ModelSpec,
    num_points: usize,
    x_range: Option<(f64, f64)>,
) -> Result<CurveOutput, FitError> {
    let (x_min, x_max) = match x_range {
        Some((lo, hi)) => {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(FitError::validation(format!(
                    "x range override must be finite with min < max (got {lo}..{hi})"
                )));
            }
            (lo, hi)
        }
        None => samples.x_range(),
    };
    let grid = linear_space(x_min, x_max, num_points)?;

    match spec.kind() {
        Some(kind) => {
            let fit = fit_model(kind, samples)?;
            Ok(CurveOutput::Single(curve_for(&fit, &grid)))
        }
        None => {
            let (fits, _) = fit_each(samples);
            let curves: Vec<CurveSample> = fits.iter().map(|fit| curve_for(fit, &grid)).collect();
            Ok(CurveOutput::All(curves))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(kind: ModelKind, r2: f64) -> FittedModel {
        FittedModel {
            kind,
            coefficients: vec![0.0; kind.coefficient_len()],
            r2,
        }
    }

    #[test]
    fn ranking_is_stable_for_ties_and_puts_nan_last() {
        let mut fits = vec![
            fit(ModelKind::Linear, 0.9),
            fit(ModelKind::Quadratic, f64::NAN),
            fit(ModelKind::Exponential, 0.95),
            fit(ModelKind::Hyperbolic, 0.9),
            fit(ModelKind::Logarithmic, -0.3),
        ];
        rank_by_r2(&mut fits);
        let order: Vec<ModelKind> = fits.iter().map(|f| f.kind).collect();
        assert_eq!(
            order,
            vec![
                ModelKind::Exponential,
                ModelKind::Linear,
                ModelKind::Hyperbolic,
                ModelKind::Logarithmic,
                ModelKind::Quadratic,
            ]
        );
    }

    #[test]
    fn fit_all_ranks_six_models_on_positive_data() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.1, 3.9, 6.2, 7.8, 10.1]).unwrap();
        let result = fit_all(&s);
        assert_eq!(result.fits.len(), 6);
        assert!(result.skipped.is_empty());
        assert!(result.best().is_some());
        for pair in result.fits.windows(2) {
            assert!(pair[0].r2 >= pair[1].r2);
        }
    }

    #[test]
    fn fit_all_skips_models_outside_their_domain() {
        let s = SampleSet::new(vec![-2.0, -1.0, 0.0, 1.0, 2.0], vec![4.0, 1.0, 0.0, 1.0, 4.0]).unwrap();
        let result = fit_all(&s);
        let kinds: Vec<ModelKind> = result.fits.iter().map(|f| f.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(result.best(), Some(ModelKind::Quadratic));
        assert!(kinds.contains(&ModelKind::Linear));

        let skipped: Vec<ModelKind> = result.skipped.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            skipped,
            vec![
                ModelKind::Exponential,
                ModelKind::Hyperbolic,
                ModelKind::Logarithmic,
                ModelKind::Power,
            ]
        );
    }

    #[test]
    fn sample_curve_single_kind_spans_the_data() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let out = sample_curve(&s, ModelSpec::Linear, 50, None).unwrap();
        let CurveOutput::Single(curve) = out else {
            panic!("expected a single curve");
        };
        assert_eq!(curve.x.len(), 50);
        assert_eq!(curve.y.len(), 50);
        assert_eq!(curve.x[0], 1.0);
        assert!((curve.x[49] - 5.0).abs() < 1e-12);
        assert!((curve.y[49] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn sample_curve_all_skips_failing_kinds() {
        let s = SampleSet::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let out = sample_curve(&s, ModelSpec::All, 11, None).unwrap();
        let kinds: Vec<ModelKind> = out.curves().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ModelKind::Linear, ModelKind::Quadratic, ModelKind::Exponential]);
    }

    #[test]
    fn sample_curve_single_kind_propagates_domain_violation() {
        let s = SampleSet::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = sample_curve(&s, ModelSpec::Hyperbolic, 10, None).unwrap_err();
        assert!(matches!(err, FitError::DomainViolation { .. }));
    }

    #[test]
    fn sample_curve_override_controls_the_grid() {
        let s = SampleSet::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        let out = sample_curve(&s, ModelSpec::Power, 5, Some((-1.0, 3.0))).unwrap();
        // Grid is -1, 0, 1, 2, 3; power skips the first two.
        assert_eq!(out.curves()[0].x, vec![1.0, 2.0, 3.0]);

        let err = sample_curve(&s, ModelSpec::Linear, 5, Some((3.0, 1.0))).unwrap_err();
        assert!(matches!(err, FitError::Validation(_)));
    }

    #[test]
    fn sample_curve_rejects_single_point_request() {
        let s = SampleSet::new(vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        let err = sample_curve(&s, ModelSpec::Linear, 1, None).unwrap_err();
        assert!(matches!(err, FitError::Validation(_)));
    }
}
