//! Mathematical utilities: dense linear solve and simple least squares.

pub mod gauss;
pub mod lsq;

pub use gauss::*;
pub use lsq::*;
