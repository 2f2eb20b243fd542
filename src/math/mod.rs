//! Mathematical utilities: least squares with an explicit conditioning check.

pub mod ols;

pub use ols::*;
