//! Regression fitting.
//!
//! Responsibilities:
//!
//! - build the design matrix from aligned training rows
//! - solve OLS and surface ill-posed fits as errors
//! - compute R² / adjusted R²

pub mod regression;

pub use regression::*;
