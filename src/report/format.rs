//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline stays free of presentation code and
//! output changes stay localized.

use chrono::NaiveDate;

use crate::app::pipeline::RunOutput;
use crate::domain::{PointSource, RunConfig, TimeSeries};

/// How many predicted dates to list before eliding.
const MAX_LISTED_DATES: usize = 12;

/// Format the full run summary (inputs, fit diagnostics, fill counts).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let ins = &config.instruments;
    let mut out = String::new();

    out.push_str("=== gapfill - regression gap fill ===\n");
    out.push_str(&format!("Target: {} | References: {}, {}\n", ins.target, ins.ref1, ins.ref2));
    out.push_str(&format!(
        "Range: {} .. {} ({:?})\n",
        config.start, config.end, config.interval
    ));
    out.push_str(&format!(
        "Prices:  {}={} {}={} {}={}\n",
        ins.target,
        run.prices.target.len(),
        ins.ref1,
        run.prices.ref1.len(),
        ins.ref2,
        run.prices.ref2.len()
    ));
    out.push_str(&format!(
        "Returns: {}={} {}={} {}={}\n",
        ins.target,
        run.returns.target.len(),
        ins.ref1,
        run.returns.ref1.len(),
        ins.ref2,
        run.returns.ref2.len()
    ));
    out.push_str(&format!(
        "Coverage: {}={} {}={} {}={}\n",
        ins.target,
        fmt_span(&run.returns.target),
        ins.ref1,
        fmt_span(&run.returns.ref1),
        ins.ref2,
        fmt_span(&run.returns.ref2)
    ));
    out.push_str(&format!(
        "Aligned rows: n={} | Prediction dates: {}\n",
        run.dataset.len(),
        run.domain.len()
    ));

    let m = &run.model;
    out.push_str("\nModel:\n");
    out.push_str(&format!("- R-squared:          {:.6}\n", m.diagnostics.r_squared));
    out.push_str(&format!("- Adjusted R-squared: {:.6}\n", m.diagnostics.adjusted_r_squared));
    out.push_str(&format!("- Intercept:          {:.6}\n", m.intercept));
    out.push_str(&format!("- Coefficient for {}: {:.6}\n", ins.ref1, m.coef_ref1));
    out.push_str(&format!("- Coefficient for {}: {:.6}\n", ins.ref2, m.coef_ref2));

    let est = &run.estimated;
    out.push_str(&format!(
        "\nEstimated: {} dates ({} actual, {} predicted)\n",
        est.len(),
        est.count(PointSource::Actual),
        est.count(PointSource::Predicted)
    ));
    let predicted = est.predicted_dates();
    if !predicted.is_empty() {
        out.push_str(&format!("Predicted dates: {}\n", fmt_dates(&predicted)));
    }
    if !run.dropped_actuals.is_empty() {
        out.push_str(&format!(
            "Dropped (no reference data): {}\n",
            fmt_dates(&run.dropped_actuals)
        ));
    }

    out
}

/// First and last observed month of a series.
fn fmt_span(series: &TimeSeries) -> String {
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!("{}..{}", first.format("%Y-%m"), last.format("%Y-%m")),
        _ => "-".to_string(),
    }
}

fn fmt_dates(dates: &[NaiveDate]) -> String {
    let mut parts: Vec<String> = dates
        .iter()
        .take(MAX_LISTED_DATES)
        .map(|d| d.format("%Y-%m").to_string())
        .collect();
    if dates.len() > MAX_LISTED_DATES {
        parts.push(format!("... (+{})", dates.len() - MAX_LISTED_DATES));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_date_lists_are_elided() {
        let dates: Vec<NaiveDate> = (1..=12)
            .chain(1..=3)
            .enumerate()
            .map(|(i, m)| NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, m, 1).unwrap())
            .collect();
        let s = fmt_dates(&dates);
        assert!(s.starts_with("2020-01, 2020-02"));
        assert!(s.ends_with("... (+3)"));
    }

    #[test]
    fn short_date_lists_are_complete() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        ];
        assert_eq!(fmt_dates(&dates), "2021-05, 2021-06");
    }

    #[test]
    fn span_covers_first_to_last_observation() {
        let d = |m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap();
        let s = TimeSeries::from_points("V", [(d(7), 0.01), (d(2), -0.02), (d(4), 0.0)]);
        assert_eq!(fmt_span(&s), "2021-02..2021-07");
        assert_eq!(fmt_span(&TimeSeries::new("V")), "-");
    }
}
