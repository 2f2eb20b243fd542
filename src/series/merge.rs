//! Combine-first merge of actual and predicted target returns.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{EstimatedPoint, EstimatedSeries, PointSource, ReturnSeries};

/// Coalesce actual and predicted values over the predicted series' dates.
///
/// For each predicted date the actual value wins when present; otherwise the
/// prediction fills the gap. Actual dates with no prediction are not carried
/// over (callers log the count via [`dropped_actuals`]).
pub fn combine_first(actual: &ReturnSeries, predicted: &BTreeMap<NaiveDate, f64>) -> EstimatedSeries {
    let points = predicted
        .iter()
        .map(|(&date, &yhat)| {
            let point = match actual.get(date) {
                Some(value) => EstimatedPoint {
                    value,
                    source: PointSource::Actual,
                },
                None => EstimatedPoint {
                    value: yhat,
                    source: PointSource::Predicted,
                },
            };
            (date, point)
        })
        .collect();

    EstimatedSeries {
        label: actual.label().to_string(),
        points,
    }
}

/// Actual observations that fall outside the predicted dates.
pub fn dropped_actuals(actual: &ReturnSeries, predicted: &BTreeMap<NaiveDate, f64>) -> Vec<NaiveDate> {
    actual.dates().filter(|d| !predicted.contains_key(d)).collect()
}
