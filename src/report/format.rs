//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{ComparisonResult, CurveOutput, FitConfig, FittedModel, ModelSpec, PointResidual};

use super::largest_residual;

/// Format the full run summary (dataset stats + comparison + chosen model).
pub fn format_run_summary(run: &RunOutput, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== curvefit - least-squares model comparison ===\n");
    out.push_str(&format!("Model: {}\n", config.model_spec.display_name()));

    let (x_min, x_max) = run.samples.x_range();
    let (y_min, y_max) = run.samples.y_range();
    out.push_str(&format!(
        "Points: n={} | x=[{x_min:.4}, {x_max:.4}] | y=[{y_min:.4}, {y_max:.4}]\n",
        run.samples.len()
    ));

    out.push('\n');
    out.push_str(&format_comparison(&run.comparison));

    out.push_str("\nChosen model:\n");
    match &run.chosen {
        Some(fit) => {
            out.push_str(&format_fit(fit));
            if let Some(worst) = largest_residual(&run.residuals) {
                out.push_str(&format!(
                    "- largest residual: {:+.4} at x={:.4}\n",
                    worst.residual, worst.x
                ));
            }
        }
        None => out.push_str("- none (no model could be fitted)\n"),
    }

    out
}

/// Describe one fitted model: kind, formula, coefficients, R².
pub fn format_fit(fit: &FittedModel) -> String {
    let coefficients: Vec<String> = fit
        .named_coefficients()
        .iter()
        .map(|(name, v)| format!("{name}={v:.6}"))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("- {} ({})\n", fit.kind.display_name(), fit.kind.id()));
    out.push_str(&format!("- formula: {}\n", fit.formula()));
    out.push_str(&format!("- coefficients: {}\n", coefficients.join(", ")));
    out.push_str(&format!("- r2: {}\n", fmt_r2(fit.r2)));
    out
}

/// Ranked comparison table; the best fit is marked with `*`.
pub fn format_comparison(comparison: &ComparisonResult) -> String {
    let mut out = String::new();
    out.push_str("Model ranking (by R²):\n");
    out.push_str(&format!("  {:<4} {:<12} {:>10}  {}\n", "rank", "model", "r2", "formula").trim_end());
    out.push('\n');
    out.push_str(&format!("  {:-<4} {:-<12} {:->10}  {:-<24}\n", "", "", "", ""));

    for (i, fit) in comparison.fits.iter().enumerate() {
        let marker = if i == 0 { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<4} {:<12} {:>10}  {}\n",
            i + 1,
            fit.kind.display_name(),
            fmt_r2(fit.r2),
            fit.formula()
        ));
    }
    if comparison.fits.is_empty() {
        out.push_str("  (no model could be fitted)\n");
    }
    for (kind, reason) in &comparison.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", kind.display_name()));
    }

    out
}

/// List the selectable kinds with their CLI identifiers.
pub fn format_model_kinds(kinds: &[(ModelSpec, &str)]) -> String {
    let mut out = String::new();
    for (spec, label) in kinds {
        out.push_str(&format!("{:<12} {label}\n", spec.id()));
    }
    out
}

/// Tabulate sampled curve points, one block per curve.
pub fn format_curves(curves: &CurveOutput) -> String {
    let mut out = String::new();
    for curve in curves.curves() {
        out.push_str(&format!(
            "# {} (r2={}, {} points)\n",
            curve.kind.display_name(),
            fmt_r2(curve.r2),
            curve.len()
        ));
        out.push_str(&format!("{:>14} {:>14}\n", "x", "y"));
        for (x, y) in curve.points() {
            out.push_str(&format!("{x:>14.6} {y:>14.6}\n"));
        }
    }
    out
}

/// Observed/fitted/residual table for the chosen model.
pub fn format_residuals(residuals: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>12} {:>12} {:>12} {:>12}\n", "x", "y_obs", "y_fit", "residual"));
    out.push_str(&format!("{:-<12} {:-<12} {:-<12} {:-<12}\n", "", "", "", ""));
    for r in residuals {
        out.push_str(&format!(
            "{:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            r.x, r.y_obs, r.y_fit, r.residual
        ));
    }
    out
}

/// R² with four decimals; NaN (constant y) prints as `n/a`.
pub fn fmt_r2(r2: f64) -> String {
    if r2.is_nan() {
        "n/a".to_string()
    } else {
        format!("{r2:.4}")
    }
}
