//! Error types.
//!
//! `EstimateError` is the library-level taxonomy returned by every pipeline stage.
//! `AppError` is what the binary reports: a message plus a process exit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the estimation pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// A price series was empty or too short to produce any return.
    #[error("No usable price data for {symbol} ({points} point(s); at least 2 required)")]
    DataUnavailable { symbol: String, points: usize },

    /// A price made a period return undefined.
    #[error("Invalid price for {symbol} on {date}: {value}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        value: f64,
    },

    /// Too few aligned rows to fit the model and its adjusted R².
    #[error("Insufficient observations: {n} aligned row(s), need more than {}", .predictors + 1)]
    InsufficientObservations { n: usize, predictors: usize },

    /// The reference series are linearly dependent (or constant).
    #[error("Collinear predictors: reciprocal condition number {rcond:.3e} below {threshold:.1e}")]
    CollinearPredictors { rcond: f64, threshold: f64 },

    /// The destination already holds a sheet with this name.
    #[error("Sheet '{sheet}' already exists in {}", .path.display())]
    SinkConflict { sheet: String, path: PathBuf },

    /// Another writer holds the destination.
    #[error("Workbook {} is locked by another writer", .path.display())]
    SinkLocked { path: PathBuf },

    /// The price source failed (network, HTTP status, payload).
    #[error("Price source error: {0}")]
    Source(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EstimateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Io { .. } | Self::Csv(_) | Self::Json(_) => 2,
            Self::DataUnavailable { .. } | Self::InvalidPrice { .. } | Self::Source(_) => 3,
            Self::InsufficientObservations { .. } | Self::CollinearPredictors { .. } => 4,
            Self::SinkConflict { .. } | Self::SinkLocked { .. } => 5,
        }
    }
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Error reported by the `gapfill` binary.
#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}
