//! Run command implementation
//!
//! Loads the job configuration, applies overrides in order (file, then
//! `CATCORR_*` environment, then flags) and runs the job locally.

use super::load_job;
use crate::error::CatcorrError;
use crate::mapreduce::{CorrelationJob, RunOptions};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Parameters of `catcorr run`
#[derive(Debug, Clone)]
pub struct RunParams {
    pub config: PathBuf,
    pub schema: Option<PathBuf>,
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub reducers: Option<usize>,
    pub scale: Option<u32>,
    pub summary: bool,
}

/// Execute a correlation job
pub async fn run_correlation_job(params: RunParams) -> Result<()> {
    let (mut config, schema) = load_job(&params.config, params.schema).await?;
    if let Some(reducers) = params.reducers {
        config.num_reducers = reducers;
    }
    if let Some(scale) = params.scale {
        config.correlation_scale = scale;
    }
    config.validate()?;

    let job = CorrelationJob::new(config, &schema).map_err(CatcorrError::from)?;
    let report = job
        .run(RunOptions {
            inputs: params.inputs,
            output_dir: params.output.clone(),
            write_summary: params.summary,
        })
        .await
        .map_err(CatcorrError::from)?;

    match &params.output {
        Some(dir) => {
            info!(
                "Wrote {} pairs to {} part files in {}",
                report.scored.len(),
                report.part_files.len(),
                dir.display()
            );
        }
        None => {
            for line in &report.lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
