//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit one model kind to a sample set (`fitter`)
//! - fit every kind, rank by R², and sample curves for plotting (`selection`)
//! - build evenly spaced x grids (`grid`)

pub mod fitter;
pub mod grid;
pub mod selection;

pub use fitter::*;
pub use grid::*;
pub use selection::*;
