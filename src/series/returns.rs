//! Price -> period return transform.

use crate::domain::{ReturnSeries, TimeSeries};
use crate::error::{EstimateError, Result};

/// Consecutive-ratio percentage change: `r[i] = p[i] / p[i-1] - 1`, keyed by the
/// date of `p[i]`.
///
/// A series of `n` prices yields `n - 1` returns; fewer than two prices yields an
/// empty series. A zero previous price makes the ratio undefined and is an error.
pub fn pct_change(prices: &TimeSeries) -> Result<ReturnSeries> {
    let mut out = ReturnSeries::new(prices.label());
    let mut prev: Option<f64> = None;

    for (date, price) in prices.iter() {
        if let Some(p0) = prev {
            if p0 == 0.0 {
                return Err(EstimateError::InvalidPrice {
                    symbol: prices.label().to_string(),
                    date,
                    value: p0,
                });
            }
            let r = price / p0 - 1.0;
            if !out.insert(date, r) {
                return Err(EstimateError::InvalidPrice {
                    symbol: prices.label().to_string(),
                    date,
                    value: price,
                });
            }
        }
        prev = Some(price);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn returns_are_ratio_minus_one() {
        let prices = TimeSeries::from_points("V", vec![(d(1), 100.0), (d(2), 110.0), (d(3), 99.0)]);
        let r = pct_change(&prices).unwrap();

        assert_eq!(r.len(), 2);
        assert_eq!(r.get(d(1)), None);
        assert_abs_diff_eq!(r.get(d(2)).unwrap(), 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(r.get(d(3)).unwrap(), -0.10, epsilon = 1e-12);
        assert_eq!(r.label(), "V");
    }

    #[test]
    fn short_series_degenerates_to_empty() {
        let one = TimeSeries::from_points("V", vec![(d(1), 100.0)]);
        assert!(pct_change(&one).unwrap().is_empty());
        assert!(pct_change(&TimeSeries::new("V")).unwrap().is_empty());
    }

    #[test]
    fn zero_price_is_rejected() {
        let prices = TimeSeries::from_points("V", vec![(d(1), 0.0), (d(2), 10.0)]);
        let err = pct_change(&prices).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidPrice { .. }));
    }

    #[test]
    fn missing_months_shorten_the_series() {
        let prices = TimeSeries::from_points(
            "V",
            vec![(d(1), 100.0), (d(2), 101.0), (d(5), 102.0), (d(6), 103.0)],
        );
        let r = pct_change(&prices).unwrap();
        assert_eq!(r.len(), prices.len() - 1);
    }
}
