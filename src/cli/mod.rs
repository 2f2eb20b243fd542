//! Command-line parsing for the gap-fill estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline. Flags that describe the environment (source, output, viewer) can
//! also come from `GAPFILL_*` variables or a `.env` file.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::domain::Interval;

/// Where prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Seeded synthetic prices (offline).
    Sample,
    /// `<SYMBOL>.csv` files in `--data-dir`.
    Csv,
}

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "gapfill",
    version,
    about = "Estimate missing monthly returns of a target instrument from two reference instruments"
)]
pub struct Cli {
    /// Target symbol whose missing returns are estimated (e.g. V).
    pub target: String,

    /// First reference symbol (e.g. MA).
    pub ref1: String,

    /// Second reference symbol (e.g. AXP).
    pub ref2: String,

    /// Start date, inclusive (YYYY-MM-DD).
    pub start: NaiveDate,

    /// End date, exclusive (YYYY-MM-DD).
    pub end: NaiveDate,

    /// Price source.
    #[arg(long, value_enum, env = "GAPFILL_SOURCE", default_value_t = SourceKind::Yahoo)]
    pub source: SourceKind,

    /// Directory of price CSVs for `--source csv`.
    #[arg(long, env = "GAPFILL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Random seed for `--source sample`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Consecutive target months removed from the synthetic path (`--source sample`).
    #[arg(long, default_value_t = 2)]
    pub sample_gap: usize,

    /// Sampling interval.
    #[arg(long, value_enum, default_value_t = Interval::Monthly)]
    pub interval: Interval,

    /// Workbook directory the result sheet is appended to.
    #[arg(short, long, env = "GAPFILL_OUTPUT", default_value = "stock-data-final")]
    pub output: PathBuf,

    /// Also write the fitted model (params + diagnostics) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,

    /// Command to open the workbook with after writing (e.g. "libreoffice").
    #[arg(long, env = "GAPFILL_VIEWER")]
    pub viewer: Option<String>,

    /// Fit and print diagnostics without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Log level when RUST_LOG is unset.
    #[arg(long, env = "GAPFILL_LOG", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_run() {
        let cli = Cli::try_parse_from(["gapfill", "V", "MA", "AXP", "2007-01-01", "2024-08-01"]).unwrap();
        assert_eq!(cli.target, "V");
        assert_eq!(cli.ref2, "AXP");
        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2007, 1, 1).unwrap());
        assert_eq!(cli.interval, Interval::Monthly);
        assert!(!cli.dry_run);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "gapfill",
            "V",
            "MA",
            "AXP",
            "2007-01-01",
            "2024-08-01",
            "--source",
            "sample",
            "--seed",
            "9",
            "--dry-run",
            "--export-model",
            "m.json",
        ])
        .unwrap();
        assert_eq!(cli.source, SourceKind::Sample);
        assert_eq!(cli.seed, 9);
        assert!(cli.dry_run);
        assert_eq!(cli.export_model, Some(PathBuf::from("m.json")));
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(Cli::try_parse_from(["gapfill", "V", "MA", "AXP", "2007-13-01", "2024-08-01"]).is_err());
    }
}
