//! Price files on disk: one `<SYMBOL>.csv` per instrument.
//!
//! Expected columns (case-insensitive): `date` and `adj_close` (`adj close` and
//! `adjclose` are accepted too, matching common downloader exports). Rows with an
//! unparsable date or price are skipped with a warning; a missing file is an
//! empty series, not an error.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::warn;

use crate::data::PriceSource;
use crate::domain::{Interval, TimeSeries};
use crate::error::{EstimateError, Result};

const PRICE_COLUMNS: [&str; 3] = ["adj_close", "adj close", "adjclose"];

/// Reads adjusted-close prices from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceSource for CsvDirSource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate, _interval: Interval) -> Result<TimeSeries> {
        let path = self.path_for(symbol);
        if !path.exists() {
            warn!(symbol, path = %path.display(), "price file not found; using empty series");
            return Ok(TimeSeries::new(symbol));
        }
        read_prices(symbol, &path, start, end)
    }
}

fn read_prices(symbol: &str, path: &Path, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
    let file = File::open(path).map_err(|e| EstimateError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| EstimateError::Config(format!("{} has no 'date' column", path.display())))?;
    let price_idx = PRICE_COLUMNS
        .iter()
        .find_map(|c| header_map.get(*c).copied())
        .ok_or_else(|| EstimateError::Config(format!("{} has no 'adj_close' column", path.display())))?;

    let mut series = TimeSeries::new(symbol);
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = i + 2;

        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            warn!(symbol, line, "skipping row with invalid date");
            continue;
        };
        if date < start || date >= end {
            continue;
        }
        let Some(price) = record.get(price_idx).and_then(|s| s.parse::<f64>().ok()) else {
            warn!(symbol, line, "skipping row with invalid price");
            continue;
        };
        if !series.insert(date, price) {
            warn!(symbol, line, "skipping non-finite price");
        }
    }

    Ok(series)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
