//! Closed-form simple least squares and goodness-of-fit helpers.
//!
//! Every two-coefficient model reduces, after its linearizing transform, to
//! fitting a straight line `z = intercept + slope * u`:
//!
//! ```text
//! slope     = (n Σuz - Σu Σz) / (n Σu² - (Σu)²)
//! intercept = (Σz - slope Σu) / n
//! ```

/// Relative size below which the slope denominator is treated as zero.
const DEGENERATE_RATIO: f64 = 8.0 * f64::EPSILON;

/// Straight-line least squares solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

/// Why a straight-line fit has no usable solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFitFailure {
    /// All `u` are equal (or there are none), so the slope is undetermined.
    ConstantInput,
    /// The sums or the solution overflowed.
    NonFinite,
}

/// Fit `z = intercept + slope * u` by ordinary least squares.
///
/// # Panics
/// Panics if `u` and `z` have different lengths. Callers validate pairing upstream.
pub fn simple_least_squares(u: &[f64], z: &[f64]) -> Result<LineFit, LineFitFailure> {
    assert_eq!(u.len(), z.len(), "u and z must be paired");
    if u.is_empty() {
        return Err(LineFitFailure::ConstantInput);
    }
    let n = u.len() as f64;

    let mut su = 0.0;
    let mut sz = 0.0;
    let mut suz = 0.0;
    let mut su2 = 0.0;
    for (&ui, &zi) in u.iter().zip(z) {
        su += ui;
        sz += zi;
        suz += ui * zi;
        su2 += ui * ui;
    }

    // `n Σu² - (Σu)²` is `n Σ(u - ū)²`; for constant `u` it only survives as
    // rounding noise, so compare against the scale of `n Σu²`.
    let denom = n * su2 - su * su;
    if !denom.is_finite() {
        return Err(LineFitFailure::NonFinite);
    }
    if denom <= DEGENERATE_RATIO * n * su2 {
        return Err(LineFitFailure::ConstantInput);
    }
    let slope = (n * suz - su * sz) / denom;
    let intercept = (sz - slope * su) / n;

    if slope.is_finite() && intercept.is_finite() {
        Ok(LineFit { intercept, slope })
    } else {
        Err(LineFitFailure::NonFinite)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Not clamped: a model worse than the mean gives a negative value. When all
/// observed values are equal (`SS_tot = 0`) the ratio is undefined and the
/// result is NaN.
pub fn r_squared(observed: &[f64], predicted: impl IntoIterator<Item = f64>) -> f64 {
    let Some(&first) = observed.first() else {
        return f64::NAN;
    };
    if observed.iter().all(|&y| y == first) {
        return f64::NAN;
    }
    let y_mean = mean(observed);

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (&y, y_hat) in observed.iter().zip(predicted) {
        ss_tot += (y - y_mean).powi(2);
        ss_res += (y - y_hat).powi(2);
    }

    if ss_tot == 0.0 {
        return f64::NAN;
    }
    1.0 - ss_res / ss_tot
}
