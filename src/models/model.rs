//! Model evaluation for the six regression forms.
//!
//! | kind        | form                | fitted as                  |
//! |-------------|---------------------|----------------------------|
//! | linear      | `y = a + b x`       | y on x                     |
//! | quadratic   | `y = a0 + a1 x + a2 x²` | normal equations (3×3) |
//! | exponential | `y = a e^(b x)`     | ln y on x                  |
//! | hyperbolic  | `y = b + a / x`     | y on 1/x                   |
//! | logarithmic | `y = a + b ln x`    | y on ln x                  |
//! | power       | `y = a x^b`         | ln y on ln x               |
//!
//! Coefficient slices always follow `ModelKind::coefficient_names()` order.

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::math::LineFit;

/// Check that the data lies in the domain the model's transform needs.
///
/// The first offending constraint is reported.
pub fn check_domain(kind: ModelKind, x: &[f64], y: &[f64]) -> Result<(), FitError> {
    let positive_y = || y.iter().all(|&v| v > 0.0);
    let positive_x = || x.iter().all(|&v| v > 0.0);

    match kind {
        ModelKind::Linear | ModelKind::Quadratic => Ok(()),
        ModelKind::Exponential => {
            if positive_y() {
                Ok(())
            } else {
                Err(FitError::domain(kind, "y values must be positive"))
            }
        }
        ModelKind::Hyperbolic => {
            if x.iter().all(|&v| v != 0.0) {
                Ok(())
            } else {
                Err(FitError::domain(kind, "x values must not be zero"))
            }
        }
        ModelKind::Logarithmic => {
            if positive_x() {
                Ok(())
            } else {
                Err(FitError::domain(kind, "x values must be positive"))
            }
        }
        ModelKind::Power => {
            if !positive_x() {
                Err(FitError::domain(kind, "x values must be positive"))
            } else if !positive_y() {
                Err(FitError::domain(kind, "y values must be positive"))
            } else {
                Ok(())
            }
        }
    }
}

/// Map `(x, y)` into the `(u, z)` plane where the model is a straight line.
///
/// Only meaningful for the two-coefficient kinds; quadratic is returned unchanged.
pub fn linearize(kind: ModelKind, x: f64, y: f64) -> (f64, f64) {
    match kind {
        ModelKind::Linear | ModelKind::Quadratic => (x, y),
        ModelKind::Exponential => (x, y.ln()),
        ModelKind::Hyperbolic => (1.0 / x, y),
        ModelKind::Logarithmic => (x.ln(), y),
        ModelKind::Power => (x.ln(), y.ln()),
    }
}

/// Convert a straight-line fit in the linearized plane back into model coefficients.
///
/// For quadratic this is the degenerate parabola with `a2 = 0`.
pub fn coefficients_from_line(kind: ModelKind, line: LineFit) -> Vec<f64> {
    match kind {
        ModelKind::Linear | ModelKind::Logarithmic => vec![line.intercept, line.slope],
        ModelKind::Exponential | ModelKind::Power => vec![line.intercept.exp(), line.slope],
        // z = b + a u with u = 1/x, so the slope is `a`.
        ModelKind::Hyperbolic => vec![line.slope, line.intercept],
        ModelKind::Quadratic => vec![line.intercept, line.slope, 0.0],
    }
}

/// Predict `y(x)` for the given model kind.
///
/// Outside the model's domain the result follows IEEE semantics (NaN/±inf).
pub fn predict(kind: ModelKind, x: f64, coefs: &[f64]) -> f64 {
    match kind {
        ModelKind::Linear => coefs[0] + coefs[1] * x,
        ModelKind::Quadratic => coefs[0] + coefs[1] * x + coefs[2] * x * x,
        ModelKind::Exponential => coefs[0] * (coefs[1] * x).exp(),
        ModelKind::Hyperbolic => coefs[1] + coefs[0] / x,
        ModelKind::Logarithmic => coefs[0] + coefs[1] * x.ln(),
        ModelKind::Power => coefs[0] * x.powf(coefs[1]),
    }
}

/// Human-readable formula with coefficients rounded to 4 decimals.
pub fn formula(kind: ModelKind, coefs: &[f64]) -> String {
    match kind {
        ModelKind::Linear => format!("y = {}{}x", fmt4(coefs[0]), signed(coefs[1])),
        ModelKind::Quadratic => format!(
            "y = {}{}x{}x²",
            fmt4(coefs[0]),
            signed(coefs[1]),
            signed(coefs[2])
        ),
        ModelKind::Exponential => format!("y = {} * e^({}x)", fmt4(coefs[0]), fmt4(coefs[1])),
        ModelKind::Hyperbolic => format!("y = {}{}/x", fmt4(coefs[1]), signed(coefs[0])),
        ModelKind::Logarithmic => format!("y = {}{}*ln(x)", fmt4(coefs[0]), signed(coefs[1])),
        ModelKind::Power => format!("y = {} * x^{}", fmt4(coefs[0]), fmt4(coefs[1])),
    }
}

fn round4(v: f64) -> f64 {
    let r = (v * 1e4).round() / 1e4;
    // Avoid printing "-0.0000".
    if r == 0.0 { 0.0 } else { r }
}

fn fmt4(v: f64) -> String {
    format!("{:.4}", round4(v))
}

fn signed(v: f64) -> String {
    let r = round4(v);
    if r < 0.0 {
        format!(" - {:.4}", -r)
    } else {
        format!(" + {r:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_matches_closed_forms() {
        assert_eq!(predict(ModelKind::Linear, 2.0, &[1.0, 3.0]), 7.0);
        assert_eq!(predict(ModelKind::Quadratic, 2.0, &[1.0, 2.0, 3.0]), 17.0);
        assert_eq!(predict(ModelKind::Hyperbolic, 2.0, &[10.0, 5.0]), 10.0);
        assert_eq!(predict(ModelKind::Power, 2.0, &[2.0, 3.0]), 16.0);
        assert!((predict(ModelKind::Exponential, 1.0, &[2.0, 1.0]) - 2.0 * 1f64.exp()).abs() < 1e-12);
        assert!((predict(ModelKind::Logarithmic, 1f64.exp(), &[2.0, 3.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn linearize_then_line_gives_back_coefficients() {
        let line = LineFit { intercept: 2f64.ln(), slope: 0.5 };
        let coefs = coefficients_from_line(ModelKind::Exponential, line);
        assert!((coefs[0] - 2.0).abs() < 1e-12);
        assert_eq!(coefs[1], 0.5);

        let line = LineFit { intercept: 5.0, slope: 10.0 };
        assert_eq!(coefficients_from_line(ModelKind::Hyperbolic, line), vec![10.0, 5.0]);
        assert_eq!(linearize(ModelKind::Hyperbolic, 4.0, 7.0), (0.25, 7.0));
    }

    #[test]
    fn domain_checks_name_the_constraint() {
        let err = check_domain(ModelKind::Exponential, &[1.0, 2.0], &[1.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("y values must be positive"));

        let err = check_domain(ModelKind::Hyperbolic, &[0.0, 2.0], &[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("x values must not be zero"));

        let err = check_domain(ModelKind::Logarithmic, &[-1.0, 2.0], &[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("x values must be positive"));

        let err = check_domain(ModelKind::Power, &[1.0, 2.0], &[-1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("y values must be positive"));

        assert!(check_domain(ModelKind::Hyperbolic, &[-1.0, 2.0], &[-1.0, 2.0]).is_ok());
        assert!(check_domain(ModelKind::Linear, &[-1.0, 0.0], &[-1.0, 0.0]).is_ok());
    }

    #[test]
    fn formulas_round_to_four_decimals() {
        assert_eq!(formula(ModelKind::Linear, &[1.0, 2.0]), "y = 1.0000 + 2.0000x");
        assert_eq!(formula(ModelKind::Linear, &[1.0, -2.5]), "y = 1.0000 - 2.5000x");
        assert_eq!(
            formula(ModelKind::Quadratic, &[1.0, 2.0, 3.000049]),
            "y = 1.0000 + 2.0000x + 3.0000x²"
        );
        assert_eq!(formula(ModelKind::Exponential, &[2.0, 0.5]), "y = 2.0000 * e^(0.5000x)");
        assert_eq!(formula(ModelKind::Hyperbolic, &[10.0, 5.0]), "y = 5.0000 + 10.0000/x");
        assert_eq!(formula(ModelKind::Logarithmic, &[2.0, 3.0]), "y = 2.0000 + 3.0000*ln(x)");
        assert_eq!(formula(ModelKind::Power, &[2.0, 3.0]), "y = 2.0000 * x^3.0000");
        assert_eq!(formula(ModelKind::Linear, &[-0.00001, 1.0]), "y = 0.0000 + 1.0000x");
    }
}
