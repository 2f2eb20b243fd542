//! Reporting utilities: export table assembly and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{EstimatedSeries, Instruments, RegressionModel, ResultRow, ResultTable};

/// Column headers of the exported sheet.
pub fn result_headers(instruments: &Instruments) -> Vec<String> {
    vec![
        "Date".to_string(),
        format!("{} Capital Gains Yield", instruments.target),
        "Adjusted R-squared".to_string(),
        "Intercept".to_string(),
        format!("Coefficient for {}", instruments.ref1),
        format!("Coefficient for {}", instruments.ref2),
    ]
}

/// One row per estimated date, model values broadcast to every row.
pub fn build_result_table(
    instruments: &Instruments,
    estimated: &EstimatedSeries,
    model: &RegressionModel,
) -> ResultTable {
    let rows = estimated
        .points
        .iter()
        .map(|(date, point)| ResultRow {
            date: date.format("%Y-%m-%d").to_string(),
            estimate: point.value,
            adjusted_r_squared: model.diagnostics.adjusted_r_squared,
            intercept: model.intercept,
            coef_ref1: model.coef_ref1,
            coef_ref2: model.coef_ref2,
        })
        .collect();

    ResultTable {
        headers: result_headers(instruments),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimatedPoint, FitDiagnostics, PointSource};
    use chrono::NaiveDate;

    #[test]
    fn table_broadcasts_model_values() {
        let instruments = Instruments {
            target: "V".to_string(),
            ref1: "MA".to_string(),
            ref2: "AXP".to_string(),
        };
        let model = RegressionModel {
            intercept: 0.001,
            coef_ref1: 0.8,
            coef_ref2: 0.1,
            diagnostics: FitDiagnostics {
                r_squared: 0.6,
                adjusted_r_squared: 0.55,
                n_observations: 30,
                n_predictors: 2,
            },
        };
        let mut estimated = EstimatedSeries {
            label: "V".to_string(),
            ..Default::default()
        };
        for (m, source) in [(1, PointSource::Actual), (2, PointSource::Predicted)] {
            estimated.points.insert(
                NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                EstimatedPoint {
                    value: m as f64 / 100.0,
                    source,
                },
            );
        }

        let table = build_result_table(&instruments, &estimated, &model);
        assert_eq!(table.headers[1], "V Capital Gains Yield");
        assert_eq!(table.headers[4], "Coefficient for MA");
        assert_eq!(table.headers[5], "Coefficient for AXP");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].date, "2024-01-01");
        assert_eq!(table.rows[1].estimate, 0.02);
        assert!(table.rows.iter().all(|r| r.adjusted_r_squared == 0.55 && r.coef_ref1 == 0.8));
        assert_eq!(table.rows[0].cells().len(), table.headers.len());
    }
}
