//! Pairs command implementation
//!
//! Prints the attribute pairs a job declares, in emission order, with the
//! field names and matrix shape of each.

use super::load_job;
use crate::error::CatcorrError;
use crate::mapreduce::JobPlan;
use anyhow::Result;
use std::path::PathBuf;

/// Pure: One listing line per declared pair
pub fn describe_pairs(plan: &JobPlan) -> Vec<String> {
    plan.pairs()
        .iter()
        .map(|spec| {
            format!(
                "{}\t{}\t{}\t{}x{}",
                spec.key,
                plan.source_field(spec).name(),
                plan.dest_field(spec).name(),
                spec.rows,
                spec.cols
            )
        })
        .collect()
}

/// List the declared pairs of a job
pub async fn run_pairs_command(config: PathBuf, schema: Option<PathBuf>) -> Result<()> {
    let (config, schema) = load_job(&config, schema).await?;
    let plan = JobPlan::resolve(&config, &schema).map_err(CatcorrError::from)?;
    for line in describe_pairs(&plan) {
        println!("{}", line);
    }
    Ok(())
}
