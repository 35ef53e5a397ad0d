//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model identifiers (`ModelKind`, `ModelSpec`)
//! - validated input data (`SampleSet`)
//! - fit outputs (`FittedModel`, `ModelSummary`, `PointResidual`, `CurveSample`, `ComparisonResult`)
//! - run configuration (`FitConfig`)

pub mod types;

pub use types::*;
