//! Two-factor OLS fit of target returns on reference returns.
//!
//! Given the aligned training rows we solve
//!
//! ```text
//! target_i = β0 + β1 * ref1_i + β2 * ref2_i + ε_i
//! ```
//!
//! and report R² plus the adjusted R² penalised for the two predictors.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{AlignedDataset, FitDiagnostics, N_PREDICTORS, RegressionModel};
use crate::error::{EstimateError, Result};
use crate::math::solve_least_squares;

/// Fit the model over `dataset`.
///
/// Fails with `InsufficientObservations` when `n <= k + 1` (adjusted R² would
/// divide by zero or go negative-DOF) and with `CollinearPredictors` when the
/// design matrix is rank deficient.
pub fn fit(dataset: &AlignedDataset) -> Result<RegressionModel> {
    let n = dataset.len();
    let k = N_PREDICTORS;
    if n <= k + 1 {
        return Err(EstimateError::InsufficientObservations { n, predictors: k });
    }

    let mut x = DMatrix::<f64>::zeros(n, k + 1);
    let mut y = DVector::<f64>::zeros(n);
    for (i, row) in dataset.rows.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = row.ref1;
        x[(i, 2)] = row.ref2;
        y[i] = row.target;
    }

    let beta = solve_least_squares(&x, &y)?;
    let fitted = &x * &beta;
    let r2 = r_squared(&y, &fitted);
    let adj = adjusted_r_squared(r2, n, k);

    debug!(n, r_squared = r2, adjusted_r_squared = adj, "ols fit complete");

    Ok(RegressionModel {
        intercept: beta[0],
        coef_ref1: beta[1],
        coef_ref2: beta[2],
        diagnostics: FitDiagnostics {
            r_squared: r2,
            adjusted_r_squared: adj,
            n_observations: n,
            n_predictors: k,
        },
    })
}

/// Coefficient of determination of `fitted` against `y`.
///
/// A constant `y` scores 1.0 when reproduced exactly and 0.0 otherwise.
pub fn r_squared(y: &DVector<f64>, fitted: &DVector<f64>) -> f64 {
    let n = y.len() as f64;
    let mean = y.sum() / n;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let sse: f64 = y.iter().zip(fitted.iter()).map(|(a, b)| (a - b).powi(2)).sum();

    if sst == 0.0 {
        return if sse == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - sse / sst).clamp(0.0, 1.0)
}

/// `1 - (1 - r2) * (n - 1) / (n - k - 1)`.
pub fn adjusted_r_squared(r2: f64, n: usize, k: usize) -> f64 {
    1.0 - (1.0 - r2) * (n as f64 - 1.0) / (n as f64 - k as f64 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlignedRow;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn dataset(rows: &[(f64, f64, f64)]) -> AlignedDataset {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, &(target, ref1, ref2))| AlignedRow {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Months::new(i as u32),
                target,
                ref1,
                ref2,
            })
            .collect();
        AlignedDataset { rows }
    }

    #[test]
    fn adjusted_r_squared_matches_formula() {
        let adj = adjusted_r_squared(0.81, 12, 2);
        assert_eq!(adj, 1.0 - (1.0 - 0.81) * 11.0 / 9.0);
        assert_abs_diff_eq!(adj, 0.767_777_777_8, epsilon = 1e-9);
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let refs = [
            (0.02, 0.01),
            (-0.03, 0.04),
            (0.05, -0.02),
            (0.01, 0.03),
            (-0.01, -0.04),
            (0.04, 0.02),
        ];
        let rows: Vec<_> = refs
            .iter()
            .map(|&(a, b)| (0.005 + 0.7 * a + 0.2 * b, a, b))
            .collect();

        let model = fit(&dataset(&rows)).unwrap();
        assert_abs_diff_eq!(model.intercept, 0.005, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coef_ref1, 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coef_ref2, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(model.diagnostics.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(model.diagnostics.n_observations, 6);
        assert_eq!(model.diagnostics.n_predictors, 2);
    }

    #[test]
    fn matches_normal_equations_on_noisy_data() {
        let rows = [
            (0.031, 0.020, 0.010),
            (-0.012, -0.030, 0.040),
            (0.047, 0.050, -0.020),
            (0.009, 0.010, 0.030),
            (-0.021, -0.010, -0.040),
            (0.028, 0.040, 0.020),
            (0.002, -0.005, 0.015),
            (-0.018, -0.025, -0.010),
        ];
        let model = fit(&dataset(&rows)).unwrap();

        // Reference: β = (XᵀX)⁻¹ Xᵀy.
        let n = rows.len();
        let mut x = DMatrix::<f64>::zeros(n, 3);
        let mut y = DVector::<f64>::zeros(n);
        for (i, &(t, a, b)) in rows.iter().enumerate() {
            x[(i, 0)] = 1.0;
            x[(i, 1)] = a;
            x[(i, 2)] = b;
            y[i] = t;
        }
        let xt = x.transpose();
        let beta = (&xt * &x).try_inverse().unwrap() * (&xt * &y);

        assert_abs_diff_eq!(model.intercept, beta[0], epsilon = 1e-9);
        assert_abs_diff_eq!(model.coef_ref1, beta[1], epsilon = 1e-9);
        assert_abs_diff_eq!(model.coef_ref2, beta[2], epsilon = 1e-9);

        let d = model.diagnostics;
        assert!((0.0..=1.0).contains(&d.r_squared));
        assert_eq!(d.adjusted_r_squared, adjusted_r_squared(d.r_squared, n, 2));
    }

    #[test]
    fn two_rows_are_insufficient() {
        let err = fit(&dataset(&[(0.01, 0.02, 0.03), (0.02, -0.01, 0.01)])).unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InsufficientObservations { n: 2, predictors: 2 }
        ));
    }

    #[test]
    fn three_rows_are_still_insufficient() {
        let err = fit(&dataset(&[(0.01, 0.02, 0.03), (0.02, -0.01, 0.01), (0.0, 0.03, -0.02)])).unwrap_err();
        assert!(matches!(err, EstimateError::InsufficientObservations { n: 3, .. }));
    }

    #[test]
    fn empty_dataset_is_insufficient() {
        let err = fit(&AlignedDataset::default()).unwrap_err();
        assert!(matches!(err, EstimateError::InsufficientObservations { n: 0, .. }));
    }

    #[test]
    fn collinear_references_are_reported() {
        // ref2 = 2 * ref1 + 0.01
        let rows: Vec<_> = [0.01, -0.02, 0.03, 0.015, -0.005]
            .iter()
            .map(|&a| (0.5 * a, a, 2.0 * a + 0.01))
            .collect();
        let err = fit(&dataset(&rows)).unwrap_err();
        assert!(matches!(err, EstimateError::CollinearPredictors { .. }));
    }

    #[test]
    fn constant_reference_is_collinear_with_intercept() {
        let rows: Vec<_> = [0.01, -0.02, 0.03, 0.015]
            .iter()
            .map(|&a| (a, a, 0.0))
            .collect();
        let err = fit(&dataset(&rows)).unwrap_err();
        assert!(matches!(err, EstimateError::CollinearPredictors { .. }));
    }
}
