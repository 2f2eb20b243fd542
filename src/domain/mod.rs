//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - date-keyed series (`TimeSeries`, `ReturnSeries`)
//! - join outputs (`AlignedDataset`, `PredictionDomain`)
//! - fit and export outputs (`RegressionModel`, `EstimatedSeries`, `ResultTable`)

pub mod types;

pub use types::*;
