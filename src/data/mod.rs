//! Price sources.
//!
//! A source maps `(symbol, start, end, interval)` to a series of adjusted close
//! prices. Sources may return empty or gappy series; "no data" is not an error
//! at this level, the pipeline decides what is usable.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Interval, TimeSeries};
use crate::error::Result;

pub mod csv_dir;
pub mod sample;
pub mod yahoo;

pub use csv_dir::CsvDirSource;
pub use sample::SampleSource;
pub use yahoo::YahooClient;

/// Anything that can supply historical prices.
pub trait PriceSource {
    /// Prices for `symbol` on dates in `[start, end)`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate, interval: Interval) -> Result<TimeSeries>;
}

/// Pre-loaded series keyed by symbol; unknown symbols yield an empty series.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, TimeSeries>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: TimeSeries) -> Self {
        self.series.insert(series.label().to_string(), series);
        self
    }
}

impl PriceSource for MemorySource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate, _interval: Interval) -> Result<TimeSeries> {
        let points = self
            .series
            .get(symbol)
            .into_iter()
            .flat_map(|s| s.iter())
            .filter(|(d, _)| *d >= start && *d < end);
        Ok(TimeSeries::from_points(symbol, points))
    }
}
