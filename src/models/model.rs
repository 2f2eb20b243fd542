//! Model evaluation.
//!
//! Prediction is a pure linear combination so it can be applied point-wise
//! (`predict`) or over a whole prediction domain (`predict_domain`).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{PredictionDomain, RegressionModel};

/// `intercept + coef_ref1 * ref1 + coef_ref2 * ref2`.
pub fn predict(model: &RegressionModel, ref1: f64, ref2: f64) -> f64 {
    model.intercept + model.coef_ref1 * ref1 + model.coef_ref2 * ref2
}

/// Predict the target on every domain date.
pub fn predict_domain(model: &RegressionModel, domain: &PredictionDomain) -> BTreeMap<NaiveDate, f64> {
    domain
        .rows
        .iter()
        .map(|row| (row.date, predict(model, row.ref1, row.ref2)))
        .collect()
}
