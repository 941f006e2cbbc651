//! Score command implementation
//!
//! Runs the reduce side on its own: merges serialized partial matrices
//! for one attribute pair and prints the scored output line.

use super::load_schema;
use crate::config::JobConfig;
use crate::error::CatcorrError;
use crate::mapreduce::{AttributePair, JobPlan, PairAggregator};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Parameters of `catcorr score`
#[derive(Debug, Clone)]
pub struct ScoreParams {
    pub schema: PathBuf,
    pub source: usize,
    pub dest: usize,
    pub scale: u32,
    pub delimiter: String,
    pub matrices: Vec<PathBuf>,
}

/// Merge the given matrices and return the output line
pub async fn score_matrices(params: ScoreParams) -> Result<String> {
    let config = JobConfig {
        schema_path: Some(params.schema),
        source_attributes: vec![params.source],
        dest_attributes: vec![params.dest],
        correlation_scale: params.scale,
        field_delim_out: params.delimiter,
        ..JobConfig::default()
    };
    config.validate()?;
    let schema = load_schema(&config)?;
    let plan = JobPlan::resolve(&config, &schema).map_err(CatcorrError::from)?;

    let mut values = Vec::new();
    for path in &params.matrices {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read matrices from {}", path.display()))?;
        values.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }
    debug!("Merging {} matrices", values.len());

    let aggregator = PairAggregator::new(Arc::new(plan));
    let scored = aggregator
        .reduce(AttributePair::new(params.source, params.dest), &values)
        .map_err(CatcorrError::from)?;
    Ok(aggregator.output_line(&scored))
}

/// Print the score of merged matrices
pub async fn run_score_command(params: ScoreParams) -> Result<()> {
    let line = score_matrices(params).await?;
    println!("{}", line);
    Ok(())
}
