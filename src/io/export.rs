//! Export fit results.
//!
//! - per-point residual CSV for the chosen model (spreadsheet friendly)
//! - ranked comparison JSON (`{fits, best, skipped}`)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::{ComparisonResult, FittedModel, ModelKind, ModelSummary, PointResidual};
use crate::error::AppError;

/// Write per-point results to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[PointResidual], fit: &FittedModel) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "model,x,y_obs,y_fit,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writeln!(
            file,
            "{},{},{},{:.10},{:.10}",
            fit.kind.id(),
            r.x,
            r.y_obs,
            r.y_fit,
            r.residual,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    info!("wrote {} residual rows to {}", residuals.len(), path.display());
    Ok(())
}

/// A kind that could not be fitted, as written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub kind: ModelKind,
    pub reason: String,
}

/// On-disk schema of the comparison export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub n_points: usize,
    /// Successful fits, best first.
    pub fits: Vec<ModelSummary>,
    pub best: Option<ModelKind>,
    pub skipped: Vec<SkippedModel>,
}

impl ResultsFile {
    pub fn from_comparison(comparison: &ComparisonResult, n_points: usize) -> Self {
        Self {
            tool: "curvefit".to_string(),
            generated_at: Utc::now(),
            n_points,
            fits: comparison.fits.iter().map(FittedModel::describe).collect(),
            best: comparison.best(),
            skipped: comparison
                .skipped
                .iter()
                .map(|(kind, reason)| SkippedModel {
                    kind: *kind,
                    reason: reason.clone(),
                })
                .collect(),
        }
    }
}

/// Write the ranked comparison to a JSON file.
pub fn write_results_json(path: &Path, comparison: &ComparisonResult, n_points: usize) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    let results = ResultsFile::from_comparison(comparison, n_points);
    serde_json::to_writer_pretty(file, &results)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    info!("wrote comparison of {} fits to {}", results.fits.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_file_keeps_ranking_and_skips() {
        let comparison = ComparisonResult {
            fits: vec![
                FittedModel {
                    kind: ModelKind::Quadratic,
                    coefficients: vec![1.0, 0.0, 1.0],
                    r2: 1.0,
                },
                FittedModel {
                    kind: ModelKind::Linear,
                    coefficients: vec![1.0, 2.0],
                    r2: f64::NAN,
                },
            ],
            skipped: vec![(ModelKind::Power, "x values must be positive".to_string())],
        };

        let file = ResultsFile::from_comparison(&comparison, 4);
        assert_eq!(file.best, Some(ModelKind::Quadratic));
        assert_eq!(file.fits[0].coefficients["a2"], 1.0);

        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"best\":\"quadratic\""));
        assert!(json.contains("\"r2\":null"));

        let back: ResultsFile = serde_json::from_str(&json).unwrap();
        assert!(back.fits[1].r2.is_nan());
        assert_eq!(back.skipped[0].kind, ModelKind::Power);
    }
}
