//! Read/write model JSON files.
//!
//! The model file is the portable record of a run: instruments, date range,
//! fitted parameters and diagnostics. The schema is `domain::ModelFile`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::domain::{EstimatedSeries, ModelFile, PointSource, RegressionModel, RunConfig};
use crate::error::{EstimateError, Result};

/// Assemble the model file for a finished run.
pub fn model_file(config: &RunConfig, model: &RegressionModel, estimated: &EstimatedSeries) -> ModelFile {
    ModelFile {
        tool: "gapfill".to_string(),
        instruments: config.instruments.clone(),
        start: config.start,
        end: config.end,
        interval: config.interval,
        model: *model,
        n_estimated: estimated.len(),
        n_predicted: estimated.count(PointSource::Predicted),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<()> {
    let out = File::create(path).map_err(|e| EstimateError::io(path, e))?;
    serde_json::to_writer_pretty(out, file)?;
    Ok(())
}

/// A model file fully written next to its destination, not yet in place.
///
/// Dropping it without [`StagedModel::commit`] removes the temp file.
#[derive(Debug)]
pub struct StagedModel {
    tmp: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedModel {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the staged file to its destination.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path).map_err(|e| EstimateError::io(&self.path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedModel {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Serialize `file` to a temp file beside `path`, so write errors surface
/// before anything else is persisted.
pub fn stage_model_json(path: &Path, file: &ModelFile) -> Result<StagedModel> {
    let name = path
        .file_name()
        .ok_or_else(|| EstimateError::Config(format!("model path {} has no file name", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.tmp", name.to_string_lossy()));
    let staged = StagedModel {
        tmp,
        path: path.to_path_buf(),
        committed: false,
    };
    write_model_json(&staged.tmp, file)?;
    Ok(staged)
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile> {
    let file = File::open(path).map_err(|e| EstimateError::io(path, e))?;
    Ok(serde_json::from_reader(file)?)
}
