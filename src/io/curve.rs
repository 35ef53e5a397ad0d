//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of sampled curves:
//! - the requested model (a kind, or `all`)
//! - one `{kind, x, y, r2}` entry per fitted curve
//!
//! It can be re-plotted later without the original samples.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CurveOutput, CurveSample, ModelSpec};
use crate::error::AppError;

/// On-disk schema of a curve export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model: ModelSpec,
    pub curves: Vec<CurveSample>,
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, model: ModelSpec, curves: &CurveOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    let curve = CurveFile {
        tool: "curvefit".to_string(),
        generated_at: Utc::now(),
        model,
        curves: curves.curves().to_vec(),
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
