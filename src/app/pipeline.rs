//! Shared estimation pipeline.
//!
//! Keeping this in one place keeps the core workflow identical for the binary,
//! tests and library callers:
//! fetch -> returns -> inner join -> fit -> predict -> combine-first -> table -> sink
//!
//! Everything after the fetch is pure; the sink is only touched once a complete
//! estimate exists.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::data::PriceSource;
use crate::domain::{
    AlignedDataset, EstimatedSeries, InstrumentSeries, Instruments, PointSource, PredictionDomain,
    RegressionModel, ResultTable, RunConfig, TimeSeries,
};
use crate::error::{EstimateError, Result};
use crate::io::workbook::TableSink;
use crate::io::{model_file, stage_model_json};
use crate::series::{combine_first, dropped_actuals, inner_join, pct_change, prediction_domain};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub prices: InstrumentSeries,
    pub returns: InstrumentSeries,
    pub dataset: AlignedDataset,
    pub domain: PredictionDomain,
    pub model: RegressionModel,
    pub estimated: EstimatedSeries,
    pub table: ResultTable,
    /// Actual target returns with no prediction date (not in the output).
    pub dropped_actuals: Vec<NaiveDate>,
}

/// Fetch the three price series for a run.
pub fn fetch_prices(source: &dyn PriceSource, config: &RunConfig) -> Result<InstrumentSeries> {
    let ins = &config.instruments;
    let fetch = |symbol: &str| -> Result<TimeSeries> {
        let series = source.fetch(symbol, config.start, config.end, config.interval)?;
        info!(symbol, points = series.len(), "fetched prices");
        Ok(series)
    };

    Ok(InstrumentSeries {
        target: fetch(&ins.target)?,
        ref1: fetch(&ins.ref1)?,
        ref2: fetch(&ins.ref2)?,
    })
}

/// Run stages 2-4 on already-fetched prices.
pub fn estimate_from_prices(instruments: &Instruments, prices: InstrumentSeries) -> Result<RunOutput> {
    for series in [&prices.target, &prices.ref1, &prices.ref2] {
        if series.len() < 2 {
            return Err(EstimateError::DataUnavailable {
                symbol: series.label().to_string(),
                points: series.len(),
            });
        }
    }

    let returns = InstrumentSeries {
        target: pct_change(&prices.target)?,
        ref1: pct_change(&prices.ref1)?,
        ref2: pct_change(&prices.ref2)?,
    };

    let dataset = inner_join(&returns.target, &returns.ref1, &returns.ref2);
    info!(rows = dataset.len(), "aligned training rows");

    let model = crate::fit::fit(&dataset)?;
    info!(
        r_squared = model.diagnostics.r_squared,
        adjusted_r_squared = model.diagnostics.adjusted_r_squared,
        intercept = model.intercept,
        coef_ref1 = model.coef_ref1,
        coef_ref2 = model.coef_ref2,
        "model fitted"
    );

    let domain = prediction_domain(&returns.ref1, &returns.ref2);
    let predicted = crate::models::predict_domain(&model, &domain);
    let estimated = combine_first(&returns.target, &predicted);
    let dropped = dropped_actuals(&returns.target, &predicted);
    if !dropped.is_empty() {
        warn!(
            count = dropped.len(),
            "actual target returns without reference data are left out of the estimate"
        );
    }
    info!(
        dates = estimated.len(),
        predicted = estimated.count(PointSource::Predicted),
        "estimated series built"
    );

    let table = crate::report::build_result_table(instruments, &estimated, &model);

    Ok(RunOutput {
        prices,
        returns,
        dataset,
        domain,
        model,
        estimated,
        table,
        dropped_actuals: dropped,
    })
}

/// Fetch and estimate without touching any sink.
pub fn run_estimation(source: &dyn PriceSource, config: &RunConfig) -> Result<RunOutput> {
    let prices = fetch_prices(source, config)?;
    estimate_from_prices(&config.instruments, prices)
}

/// Persist a finished run.
///
/// The optional model file is serialized before the sheet is appended and only
/// moved into place afterwards, so a failed write never leaves a sheet behind.
pub fn export(run: &RunOutput, sink: &mut dyn TableSink, config: &RunConfig) -> Result<()> {
    let staged = config
        .export_model
        .as_deref()
        .map(|path| stage_model_json(path, &model_file(config, &run.model, &run.estimated)))
        .transpose()?;

    let sheet = config.sheet_name();
    sink.append_sheet(&sheet, &run.table)?;
    info!(sheet = %sheet, rows = run.table.rows.len(), "sheet appended");

    if let Some(staged) = staged {
        let path = staged.path().to_path_buf();
        staged.commit()?;
        info!(path = %path.display(), "model written");
    }
    Ok(())
}

/// Execute the full pipeline.
pub fn run_pipeline(source: &dyn PriceSource, sink: &mut dyn TableSink, config: &RunConfig) -> Result<RunOutput> {
    let run = run_estimation(source, config)?;
    if config.dry_run {
        info!("dry run; nothing written");
    } else {
        export(&run, sink, config)?;
    }
    Ok(run)
}
