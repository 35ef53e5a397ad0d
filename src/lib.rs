//! `curvefit` library crate.
//!
//! Least-squares fitting of six regression models (linear, quadratic,
//! exponential, hyperbolic, logarithmic, power) with R²-based comparison.
//!
//! The binary (`curvefit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting core can be embedded without the CLI/TUI front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
