//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - handed to the report/plot/TUI front-ends without conversion

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Concrete regression model kind.
///
/// The declaration order is the fixed attempt order used by comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Quadratic,
    Exponential,
    Hyperbolic,
    Logarithmic,
    Power,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Linear,
        ModelKind::Quadratic,
        ModelKind::Exponential,
        ModelKind::Hyperbolic,
        ModelKind::Logarithmic,
        ModelKind::Power,
    ];

    /// Stable lowercase identifier (matches the serde/CLI name).
    pub fn id(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Quadratic => "quadratic",
            ModelKind::Exponential => "exponential",
            ModelKind::Hyperbolic => "hyperbolic",
            ModelKind::Logarithmic => "logarithmic",
            ModelKind::Power => "power",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear",
            ModelKind::Quadratic => "Quadratic",
            ModelKind::Exponential => "Exponential",
            ModelKind::Hyperbolic => "Hyperbolic",
            ModelKind::Logarithmic => "Logarithmic",
            ModelKind::Power => "Power",
        }
    }

    /// Coefficient names, in the order they are stored in `FittedModel::coefficients`.
    pub fn coefficient_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Quadratic => &["a0", "a1", "a2"],
            _ => &["a", "b"],
        }
    }

    /// Number of fitted coefficients.
    pub fn coefficient_len(self) -> usize {
        self.coefficient_names().len()
    }

    /// Whether curve sampling must skip x values `<= 0` for this kind.
    pub fn requires_positive_x_samples(self) -> bool {
        matches!(
            self,
            ModelKind::Hyperbolic | ModelKind::Logarithmic | ModelKind::Power
        )
    }

    pub fn next(self) -> ModelKind {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Which model(s) an operation targets: one kind, or the virtual "all" kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    Linear,
    #[value(alias = "parabolic")]
    Quadratic,
    Exponential,
    #[value(alias = "reciprocal")]
    Hyperbolic,
    Logarithmic,
    Power,
    All,
}

impl ModelSpec {
    pub fn kind(self) -> Option<ModelKind> {
        match self {
            ModelSpec::Linear => Some(ModelKind::Linear),
            ModelSpec::Quadratic => Some(ModelKind::Quadratic),
            ModelSpec::Exponential => Some(ModelKind::Exponential),
            ModelSpec::Hyperbolic => Some(ModelKind::Hyperbolic),
            ModelSpec::Logarithmic => Some(ModelKind::Logarithmic),
            ModelSpec::Power => Some(ModelKind::Power),
            ModelSpec::All => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.id(),
            None => "all",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.display_name(),
            None => "Compare all",
        }
    }
}

impl From<ModelKind> for ModelSpec {
    fn from(value: ModelKind) -> Self {
        match value {
            ModelKind::Linear => ModelSpec::Linear,
            ModelKind::Quadratic => ModelSpec::Quadratic,
            ModelKind::Exponential => ModelSpec::Exponential,
            ModelKind::Hyperbolic => ModelSpec::Hyperbolic,
            ModelKind::Logarithmic => ModelSpec::Logarithmic,
            ModelKind::Power => ModelSpec::Power,
        }
    }
}

/// Paired `(x, y)` observations, immutable once built.
///
/// Construction validates the pairing so fitters never see ragged input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Minimum number of points a single-model fit accepts.
pub const MIN_POINTS: usize = 2;

impl SampleSet {
    /// Build a sample set for single-model fitting (at least two points).
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FitError> {
        Self::with_min_points(x, y, MIN_POINTS)
    }

    /// Build a sample set requiring at least `min_points` pairs (never less than one).
    pub fn with_min_points(x: Vec<f64>, y: Vec<f64>, min_points: usize) -> Result<Self, FitError> {
        if x.is_empty() || y.is_empty() {
            return Err(FitError::validation("x and y values are required"));
        }
        if x.len() != y.len() {
            return Err(FitError::validation(format!(
                "x and y must have the same length (got {} and {})",
                x.len(),
                y.len()
            )));
        }
        let min_points = min_points.max(1);
        if x.len() < min_points {
            return Err(FitError::validation(format!(
                "at least {min_points} points are required (got {})",
                x.len()
            )));
        }
        if let Some(i) = x.iter().zip(&y).position(|(a, b)| !(a.is_finite() && b.is_finite())) {
            return Err(FitError::validation(format!(
                "point {i} is not finite (x={}, y={})",
                x[i], y[i]
            )));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// `(min, max)` of the x values.
    pub fn x_range(&self) -> (f64, f64) {
        self.x
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// `(min, max)` of the y values.
    pub fn y_range(&self) -> (f64, f64) {
        self.y
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// A model fitted to a sample set.
///
/// `coefficients` follows `kind.coefficient_names()` order. After fitting the
/// value is immutable and can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub coefficients: Vec<f64>,
    /// Coefficient of determination. NaN when the observed y values are constant.
    #[serde(deserialize_with = "r2_or_nan")]
    pub r2: f64,
}

/// Display/transport form of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub kind: ModelKind,
    pub coefficients: BTreeMap<String, f64>,
    #[serde(deserialize_with = "r2_or_nan")]
    pub r2: f64,
    pub formula: String,
}

/// JSON has no NaN: serde_json writes it as `null`, so read `null` back as NaN.
fn r2_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Like `r2_or_nan`, element-wise.
fn values_or_nan<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Observed vs fitted value at one sample point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    /// `y_obs - y_fit`.
    pub residual: f64,
}

/// Densely sampled `(x, ŷ)` points for one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    pub kind: ModelKind,
    pub x: Vec<f64>,
    /// Predicted values; may hold non-finite entries where the model overflows.
    #[serde(deserialize_with = "values_or_nan")]
    pub y: Vec<f64>,
    #[serde(deserialize_with = "r2_or_nan")]
    pub r2: f64,
}

impl CurveSample {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Output of `sample_curve`: one curve, or one curve per kind that fitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CurveOutput {
    Single(CurveSample),
    All(Vec<CurveSample>),
}

impl CurveOutput {
    pub fn curves(&self) -> &[CurveSample] {
        match self {
            CurveOutput::Single(curve) => std::slice::from_ref(curve),
            CurveOutput::All(curves) => curves,
        }
    }
}

/// Ranked result of fitting every model kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Successful fits, sorted by R² descending (stable with respect to attempt order).
    pub fits: Vec<FittedModel>,
    /// Kinds that could not be fitted, with the reason.
    pub skipped: Vec<(ModelKind, String)>,
}

impl ComparisonResult {
    /// Kind of the best-ranked fit, if any model succeeded.
    pub fn best(&self) -> Option<ModelKind> {
        self.fits.first().map(|f| f.kind)
    }

    pub fn best_fit(&self) -> Option<&FittedModel> {
        self.fits.first()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model_spec: ModelSpec,
    /// Number of curve points to sample for plotting/export.
    pub num_points: usize,
    /// Optional `[min, max]` override for curve sampling.
    pub x_range: Option<(f64, f64)>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub show_residuals: bool,

    /// Per-point residual CSV for the chosen model.
    pub export_results: Option<PathBuf>,
    /// Ranked comparison JSON.
    pub export_json: Option<PathBuf>,
    /// Sampled curve JSON.
    pub export_curve: Option<PathBuf>,
}

/// Default number of sampled curve points.
pub const DEFAULT_NUM_POINTS: usize = 100;

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            model_spec: ModelSpec::All,
            num_points: DEFAULT_NUM_POINTS,
            x_range: None,
            plot: true,
            plot_width: 80,
            plot_height: 20,
            show_residuals: false,
            export_results: None,
            export_json: None,
            export_curve: None,
        }
    }
}
