//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - builds the price source and workbook sink
//! - runs the pipeline and prints the summary
//! - optionally opens a viewer on the output

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, SourceKind};
use crate::data::{CsvDirSource, PriceSource, SampleSource, YahooClient};
use crate::data::sample::period_dates;
use crate::domain::{Instruments, RunConfig};
use crate::error::{AppError, EstimateError};
use crate::io::CsvWorkbook;

pub mod pipeline;
pub mod viewer;

/// Entry point for the `gapfill` binary.
pub fn run() -> Result<(), AppError> {
    // Load `.env` before parsing so `GAPFILL_*` defaults apply.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = run_config_from_args(&cli)?;
    let source = build_source(&cli, &config)?;
    let mut sink = CsvWorkbook::new(&config.output);

    let run = pipeline::run_pipeline(source.as_ref(), &mut sink, &config)?;
    println!("{}", crate::report::format_run_summary(&run, &config));

    if !config.dry_run {
        println!(
            "Estimation for {} saved to sheet '{}' in {}",
            config.instruments.target,
            config.sheet_name(),
            sink.root().display()
        );
        if let Some(cmd) = &config.viewer {
            viewer::open(cmd, sink.root());
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Validate CLI arguments into a run configuration.
pub fn run_config_from_args(cli: &Cli) -> Result<RunConfig, EstimateError> {
    let instruments = Instruments {
        target: cli.target.trim().to_uppercase(),
        ref1: cli.ref1.trim().to_uppercase(),
        ref2: cli.ref2.trim().to_uppercase(),
    };

    if [&instruments.target, &instruments.ref1, &instruments.ref2]
        .iter()
        .any(|s| s.is_empty())
    {
        return Err(EstimateError::Config("symbols must be non-empty".to_string()));
    }
    if instruments.target == instruments.ref1
        || instruments.target == instruments.ref2
        || instruments.ref1 == instruments.ref2
    {
        return Err(EstimateError::Config(format!(
            "symbols must be distinct (got {}, {}, {})",
            instruments.target, instruments.ref1, instruments.ref2
        )));
    }
    if cli.start >= cli.end {
        return Err(EstimateError::Config(format!(
            "start date {} must be before end date {}",
            cli.start, cli.end
        )));
    }
    if cli.source == SourceKind::Csv && cli.data_dir.is_none() {
        return Err(EstimateError::Config("--source csv requires --data-dir".to_string()));
    }

    Ok(RunConfig {
        instruments,
        start: cli.start,
        end: cli.end,
        interval: cli.interval,
        output: cli.output.clone(),
        dry_run: cli.dry_run,
        export_model: cli.export_model.clone(),
        viewer: cli.viewer.clone().filter(|v| !v.trim().is_empty()),
    })
}

fn build_source(cli: &Cli, config: &RunConfig) -> Result<Box<dyn PriceSource>, EstimateError> {
    Ok(match cli.source {
        SourceKind::Yahoo => Box::new(YahooClient::new()?),
        SourceKind::Csv => {
            let dir = cli
                .data_dir
                .clone()
                .ok_or_else(|| EstimateError::Config("--source csv requires --data-dir".to_string()))?;
            Box::new(CsvDirSource::new(dir))
        }
        SourceKind::Sample => {
            let gap = sample_gap_dates(config, cli.sample_gap);
            Box::new(SampleSource::new(cli.seed).with_gap(config.instruments.target.clone(), gap))
        }
    })
}

/// `n` consecutive periods from the middle of the run's range.
fn sample_gap_dates(config: &RunConfig, n: usize) -> Vec<NaiveDate> {
    let dates = period_dates(config.start, config.end, config.interval);
    // Keep at least one period on either side so the gap is interior.
    if n == 0 || dates.len() < n + 2 {
        return Vec::new();
    }
    let from = (dates.len() - n) / 2;
    dates[from..from + n].to_vec()
}
