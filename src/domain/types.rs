//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built by price sources and pure series transforms
//! - exported to CSV sheets / JSON
//! - inspected directly in tests

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of reference instruments the model regresses on.
pub const N_PREDICTORS: usize = 2;

/// Sampling interval requested from a price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Interval code understood by the Yahoo chart endpoint.
    pub fn yahoo_code(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

/// A labeled, date-keyed series of observations.
///
/// Dates are unique and iterate in ascending order. A date that is not present
/// means "no observation"; values are always finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    label: String,
    points: BTreeMap<NaiveDate, f64>,
}

/// A period-over-period percentage-change series derived from prices.
pub type ReturnSeries = TimeSeries;

impl TimeSeries {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            points: BTreeMap::new(),
        }
    }

    /// Build a series from `(date, value)` pairs.
    ///
    /// Non-finite values are treated as missing observations and skipped. If a
    /// date repeats, the last value wins.
    pub fn from_points<I>(label: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut series = Self::new(label);
        for (date, value) in points {
            series.insert(date, value);
        }
        series
    }

    /// Insert an observation. Returns `false` (and stores nothing) for non-finite values.
    pub fn insert(&mut self, date: NaiveDate, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.points.insert(date, value);
        true
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.points.contains_key(&date)
    }

    /// Iterate `(date, value)` in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Drop every observation in `dates`.
    pub fn without_dates(mut self, dates: &[NaiveDate]) -> Self {
        for d in dates {
            self.points.remove(d);
        }
        self
    }
}

/// One training row: the three returns observed on the same date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub target: f64,
    pub ref1: f64,
    pub ref2: f64,
}

/// Inner join of the target and both reference return series (training set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedDataset {
    pub rows: Vec<AlignedRow>,
}

impl AlignedDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// One prediction input row: both reference returns on a date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainRow {
    pub date: NaiveDate,
    pub ref1: f64,
    pub ref2: f64,
}

/// Dates (with reference values) on which the target is estimated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionDomain {
    pub rows: Vec<DomainRow>,
}

impl PredictionDomain {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// Goodness-of-fit diagnostics for a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub n_observations: usize,
    pub n_predictors: usize,
}

/// Fitted two-factor linear model: `target = intercept + coef_ref1*ref1 + coef_ref2*ref2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub intercept: f64,
    pub coef_ref1: f64,
    pub coef_ref2: f64,
    pub diagnostics: FitDiagnostics,
}

/// Where an estimated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    Actual,
    Predicted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedPoint {
    pub value: f64,
    pub source: PointSource,
}

/// Target returns over the prediction domain with every gap filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatedSeries {
    pub label: String,
    pub points: BTreeMap<NaiveDate, EstimatedPoint>,
}

impl EstimatedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<EstimatedPoint> {
        self.points.get(&date).copied()
    }

    pub fn count(&self, source: PointSource) -> usize {
        self.points.values().filter(|p| p.source == source).count()
    }

    /// Dates whose value came from the model.
    pub fn predicted_dates(&self) -> Vec<NaiveDate> {
        self.points
            .iter()
            .filter(|(_, p)| p.source == PointSource::Predicted)
            .map(|(d, _)| *d)
            .collect()
    }
}

/// The three instruments of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruments {
    pub target: String,
    pub ref1: String,
    pub ref2: String,
}

/// One series per instrument of a run (prices or returns).
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSeries {
    pub target: TimeSeries,
    pub ref1: TimeSeries,
    pub ref2: TimeSeries,
}

/// One exported row; model values are repeated on every row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub date: String,
    pub estimate: f64,
    pub adjusted_r_squared: f64,
    pub intercept: f64,
    pub coef_ref1: f64,
    pub coef_ref2: f64,
}

impl ResultRow {
    /// Cells in header order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.estimate.to_string(),
            self.adjusted_r_squared.to_string(),
            self.intercept.to_string(),
            self.coef_ref1.to_string(),
            self.coef_ref2.to_string(),
        ]
    }
}

/// A flat table ready to hand to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<ResultRow>,
}

/// A saved model file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub instruments: Instruments,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
    pub model: RegressionModel,
    pub n_estimated: usize,
    pub n_predicted: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub instruments: Instruments,
    pub start: NaiveDate,
    /// Exclusive end of the requested range.
    pub end: NaiveDate,
    pub interval: Interval,
    /// Workbook destination.
    pub output: PathBuf,
    /// Skip the sheet write (diagnostics only).
    pub dry_run: bool,
    pub export_model: Option<PathBuf>,
    /// Command launched on the workbook after a successful write.
    pub viewer: Option<String>,
}

impl RunConfig {
    /// Name of the sheet this run appends.
    pub fn sheet_name(&self) -> String {
        format!("{} Estimation", self.instruments.target)
    }
}
