//! Local job runner
//!
//! Ties configuration, schema and the phase pipeline together into one
//! correlation job run on the local machine.

use super::counters::JobCounters;
use super::errors::MapReduceResult;
use super::output::{prepare_output_dir, write_summary};
use super::phases::{PairAggregator, PhaseContext, PhaseCoordinator, PhaseResult};
use super::plan::JobPlan;
use super::ScoredPair;
use crate::config::JobConfig;
use crate::schema::FeatureSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Where a run reads from and writes to
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    /// Directory for the part files; results stay in memory when unset
    pub output_dir: Option<PathBuf>,
    /// Also write `_SUCCESS.json` into the output directory
    pub write_summary: bool,
}

/// Machine-readable summary of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub inputs: Vec<PathBuf>,
    pub num_reducers: usize,
    pub correlation_scale: u32,
    pub counters: JobCounters,
    pub phases: Vec<PhaseResult>,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct JobReport {
    pub summary: JobSummary,
    /// Scored pairs in key order
    pub scored: Vec<ScoredPair>,
    /// Rendered output lines, one per scored pair in key order
    pub lines: Vec<String>,
    pub part_files: Vec<PathBuf>,
}

/// A correlation job resolved against its schema
pub struct CorrelationJob {
    config: JobConfig,
    plan: Arc<JobPlan>,
}

impl CorrelationJob {
    pub fn new(config: JobConfig, schema: &FeatureSchema) -> MapReduceResult<Self> {
        let plan = Arc::new(JobPlan::resolve(&config, schema)?);
        Ok(Self { config, plan })
    }

    pub fn plan(&self) -> &JobPlan {
        &self.plan
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Run the job to completion
    pub async fn run(&self, options: RunOptions) -> MapReduceResult<JobReport> {
        let job_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(
            "Starting correlation job {} over {} pairs",
            job_id,
            self.plan.pairs().len()
        );

        if let Some(dir) = &options.output_dir {
            prepare_output_dir(dir).await?;
        }

        let coordinator = PhaseCoordinator::new(
            self.config.split_size,
            self.config.effective_max_parallel_mappers(),
            options.output_dir.clone(),
        );
        let mut context = PhaseContext::new(self.plan.clone()).with_inputs(options.inputs.clone());
        let phases = coordinator.execute_job(&mut context).await?;

        let aggregator = PairAggregator::new(self.plan.clone());
        let lines = context
            .scored
            .iter()
            .map(|scored| aggregator.output_line(scored))
            .collect();

        let summary = JobSummary {
            job_id,
            started_at,
            finished_at: Utc::now(),
            inputs: options.inputs,
            num_reducers: self.plan.num_reducers(),
            correlation_scale: self.plan.correlation_scale(),
            counters: context.counters,
            phases,
        };
        log_counters(&summary.counters);

        if options.write_summary {
            match &options.output_dir {
                Some(dir) => {
                    let path = write_summary(dir, &summary).await?;
                    info!("Wrote job summary to {}", path.display());
                }
                None => warn!("No output directory; job summary not written"),
            }
        }

        info!("Correlation job {} completed", summary.job_id);
        Ok(JobReport {
            summary,
            scored: context.scored,
            lines,
            part_files: context.part_files,
        })
    }
}

fn log_counters(counters: &JobCounters) {
    info!(
        partitions = counters.partitions,
        records_read = counters.records_read,
        records_malformed = counters.records_malformed,
        unrecognized_values = counters.unrecognized_values,
        pair_increments = counters.pair_increments,
        pairs_scored = counters.pairs_scored,
        pairs_undefined = counters.pairs_undefined,
        "Job counters"
    );
    for (pair, skipped) in &counters.skipped_increments {
        info!("Pair {}: {} increments skipped", pair, skipped);
    }
}
