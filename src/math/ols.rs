//! Ordinary least squares solver.
//!
//! We solve small problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! via the SVD of the design matrix. Before solving, the reciprocal condition
//! number `σ_min / σ_max` is checked explicitly: a rank-deficient design (e.g. one
//! reference column is an affine function of the other) is reported as
//! `CollinearPredictors` instead of being resolved by a pseudo-inverse.
//!
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices, hence SVD.)

use nalgebra::{DMatrix, DVector};

use crate::error::{EstimateError, Result};

/// Smallest accepted `σ_min / σ_max` before the design is treated as singular.
pub const RCOND_THRESHOLD: f64 = 1e-10;

/// Reciprocal condition number of `x` (0.0 for an all-zero matrix).
pub fn reciprocal_condition(x: &DMatrix<f64>) -> f64 {
    let singular = x.singular_values();
    let max = singular.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    // A wide matrix has fewer singular values than columns; its rank is short by definition.
    if singular.len() < x.ncols() {
        return 0.0;
    }
    let min = singular.iter().copied().fold(f64::INFINITY, f64::min);
    min / max
}

/// Solve a least squares problem using SVD, rejecting ill-conditioned designs.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    let rcond = reciprocal_condition(x);
    if rcond.is_nan() || rcond < RCOND_THRESHOLD {
        return Err(EstimateError::CollinearPredictors {
            rcond,
            threshold: RCOND_THRESHOLD,
        });
    }

    let svd = x.clone().svd(true, true);
    let beta = svd
        .solve(y, 0.0)
        .map_err(|_| EstimateError::CollinearPredictors {
            rcond,
            threshold: RCOND_THRESHOLD,
        })?;

    if beta.iter().all(|v| v.is_finite()) {
        Ok(beta)
    } else {
        Err(EstimateError::CollinearPredictors {
            rcond,
            threshold: RCOND_THRESHOLD,
        })
    }
}
