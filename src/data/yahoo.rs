//! Yahoo Finance chart API integration (adjusted close prices).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::PriceSource;
use crate::domain::{Interval, TimeSeries};
use crate::error::{EstimateError, Result};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = concat!("gapfill/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the Yahoo v8 chart endpoint.
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Use a different endpoint root (mirrors, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EstimateError::Source(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PriceSource for YahooClient {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate, interval: Interval) -> Result<TimeSeries> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.yahoo_code().to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .map_err(|e| EstimateError::Source(format!("Yahoo request for {symbol} failed: {e}")))?;

        // Unknown symbols come back as 404 with a JSON error body; treat as "no data".
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(symbol, "yahoo returned 404; treating as empty series");
            return Ok(TimeSeries::new(symbol));
        }
        if !resp.status().is_success() {
            return Err(EstimateError::Source(format!(
                "Yahoo request for {symbol} failed with status {}.",
                resp.status()
            )));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| EstimateError::Source(format!("Failed to parse Yahoo response for {symbol}: {e}")))?;

        let series = parse_chart(symbol, body, interval)?;
        Ok(filter_range(series, start, end))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

/// Bars are stamped at exchange-local midnight; `gmtoffset` is that exchange's UTC offset in seconds.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
    #[serde(default)]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn parse_chart(symbol: &str, body: ChartResponse, interval: Interval) -> Result<TimeSeries> {
    if let Some(err) = body.chart.error {
        if err.code == "Not Found" {
            return Ok(TimeSeries::new(symbol));
        }
        return Err(EstimateError::Source(format!(
            "Yahoo error for {symbol}: {} ({})",
            err.description, err.code
        )));
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(TimeSeries::new(symbol));
    };

    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() && !closes.is_empty() {
        return Err(EstimateError::Source(format!(
            "Yahoo payload for {symbol} has {} timestamps but {} prices.",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let offset = result.meta.gmtoffset;
    if offset != 0 {
        debug!(
            symbol,
            offset,
            timezone = result.meta.exchange_timezone_name.as_deref().unwrap_or("?"),
            "shifting bar stamps to exchange-local time"
        );
    }

    let mut series = TimeSeries::new(symbol);
    for (ts, close) in result.timestamp.iter().zip(closes) {
        // Null closes are missing observations.
        let Some(close) = close else { continue };
        let Some(dt) = ts.checked_add(offset).and_then(|local| DateTime::from_timestamp(local, 0)) else {
            return Err(EstimateError::Source(format!(
                "Invalid timestamp {ts} in Yahoo payload for {symbol}."
            )));
        };
        series.insert(normalize_date(dt.date_naive(), interval), close);
    }

    Ok(series)
}

/// Monthly bars are keyed by the first day of their month.
fn normalize_date(date: NaiveDate, interval: Interval) -> NaiveDate {
    match interval {
        Interval::Monthly => date.with_day(1).unwrap_or(date),
        Interval::Weekly | Interval::Daily => date,
    }
}

fn filter_range(series: TimeSeries, start: NaiveDate, end: NaiveDate) -> TimeSeries {
    let label = series.label().to_string();
    TimeSeries::from_points(label, series.iter().filter(|(d, _)| *d >= start && *d < end))
}
