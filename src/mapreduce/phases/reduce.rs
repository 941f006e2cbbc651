//! Reduce phase: per-pair merge and scoring
//!
//! The shuffle delivers every partial matrix of a pair to exactly one
//! reducer. The reducer merges them into the pair's final matrix, computes
//! Cramer's V and renders one output line per pair.

use super::{PhaseContext, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType};
use crate::mapreduce::errors::{MapReduceError, MapReduceResult};
use crate::mapreduce::output::write_part_file;
use crate::mapreduce::plan::{JobPlan, PairSpec};
use crate::mapreduce::pure::{format_output_line, merge_partials};
use crate::mapreduce::shuffle::{shuffle, ReducerInput};
use crate::mapreduce::{AttributePair, ScoredPair};
use crate::matrix::{ContingencyMatrix, MatrixError};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace};

/// Reduce-side aggregator for attribute pairs
#[derive(Debug, Clone)]
pub struct PairAggregator {
    plan: Arc<JobPlan>,
}

impl PairAggregator {
    pub fn new(plan: Arc<JobPlan>) -> Self {
        Self { plan }
    }

    fn spec(&self, key: &AttributePair) -> MapReduceResult<&PairSpec> {
        self.plan
            .pair(key)
            .ok_or(MapReduceError::UnknownPair { pair: *key })
    }

    /// Merge every serialized partial for `key`
    ///
    /// The result always has the pair's declared shape. A partial of any
    /// other shape fails with `SchemaMismatch`; an undecodable one with
    /// `MalformedPartial`.
    pub fn aggregate(&self, key: AttributePair, values: &[String]) -> MapReduceResult<ContingencyMatrix> {
        let spec = self.spec(&key)?;
        let merged = merge_partials(key, spec.rows, spec.cols, values)?;
        trace!("Merged {} partials for {}: {}", values.len(), key, merged);
        Ok(merged)
    }

    /// Score a merged matrix
    pub fn score(&self, key: AttributePair, merged: &ContingencyMatrix) -> MapReduceResult<ScoredPair> {
        let spec = self.spec(&key)?;
        merged
            .ensure_shape(spec.rows, spec.cols)
            .map_err(|source: MatrixError| MapReduceError::SchemaMismatch { pair: key, source })?;

        let index = merged.cramer_index();
        debug!("Pair {} over {} records: {:?}", key, merged.total(), index);
        Ok(ScoredPair {
            key,
            source_name: self.plan.source_field(spec).name().to_string(),
            dest_name: self.plan.dest_field(spec).name().to_string(),
            total: merged.total(),
            index,
        })
    }

    /// Aggregate then score
    pub fn reduce(&self, key: AttributePair, values: &[String]) -> MapReduceResult<ScoredPair> {
        let merged = self.aggregate(key, values)?;
        self.score(key, &merged)
    }

    /// Render the output line of a scored pair
    pub fn output_line(&self, scored: &ScoredPair) -> String {
        format_output_line(
            scored,
            self.plan.output_delimiter(),
            self.plan.correlation_scale(),
        )
    }
}

/// Pure: Reduce every key of one bucket, in key order
pub fn reduce_bucket(plan: Arc<JobPlan>, bucket: &ReducerInput) -> MapReduceResult<Vec<ScoredPair>> {
    let aggregator = PairAggregator::new(plan);
    bucket
        .groups
        .iter()
        .map(|(key, values)| aggregator.reduce(*key, values))
        .collect()
}

struct ReducerOutput {
    reducer: usize,
    scored: Vec<ScoredPair>,
    part_file: Option<PathBuf>,
}

/// Executor for the reduce phase
pub struct ReducePhaseExecutor {
    output_dir: Option<PathBuf>,
}

impl ReducePhaseExecutor {
    /// Reducer that only keeps results in memory
    pub fn new() -> Self {
        Self { output_dir: None }
    }

    /// Reducer that also writes one part file per reducer into `dir`
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
        }
    }

    async fn run_reducer(
        plan: Arc<JobPlan>,
        bucket: ReducerInput,
        output_dir: Option<PathBuf>,
    ) -> MapReduceResult<ReducerOutput> {
        let reducer = bucket.reducer;
        let scoring_plan = plan.clone();
        let scored = tokio::task::spawn_blocking(move || reduce_bucket(scoring_plan, &bucket))
            .await
            .map_err(|e| MapReduceError::TaskFailed {
                phase: PhaseType::Reduce,
                message: e.to_string(),
            })??;

        let part_file = match output_dir {
            Some(dir) => {
                let aggregator = PairAggregator::new(plan);
                let lines: Vec<String> = scored.iter().map(|s| aggregator.output_line(s)).collect();
                Some(write_part_file(&dir, reducer, &lines).await?)
            }
            None => None,
        };

        Ok(ReducerOutput {
            reducer,
            scored,
            part_file,
        })
    }
}

impl Default for ReducePhaseExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhaseExecutor for ReducePhaseExecutor {
    async fn execute(&self, context: &mut PhaseContext) -> MapReduceResult<PhaseResult> {
        let start = Instant::now();
        let plan = context.plan.clone();
        let map_output = std::mem::take(&mut context.map_output);
        let buckets = shuffle(&plan, map_output);

        info!(
            "Starting reduce phase: {} pairs across {} reducers",
            plan.pairs().len(),
            buckets.len()
        );

        let semaphore = Arc::new(Semaphore::new(plan.num_reducers().max(1)));
        let mut futures = FuturesUnordered::new();
        for bucket in buckets {
            let semaphore = semaphore.clone();
            let plan = plan.clone();
            let output_dir = self.output_dir.clone();
            futures.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| MapReduceError::TaskFailed {
                        phase: PhaseType::Reduce,
                        message: e.to_string(),
                    })?;
                Self::run_reducer(plan, bucket, output_dir).await
            }));
        }

        let mut outputs = Vec::new();
        while let Some(joined) = futures.next().await {
            match joined {
                Ok(Ok(output)) => outputs.push(output),
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    return Err(MapReduceError::TaskFailed {
                        phase: PhaseType::Reduce,
                        message: e.to_string(),
                    })
                }
            }
        }
        outputs.sort_by_key(|o| o.reducer);

        let reducers = outputs.len();
        for output in outputs {
            context.scored.extend(output.scored);
            context.part_files.extend(output.part_file);
        }
        context.scored.sort_by_key(|s| s.key);

        let undefined = context.scored.iter().filter(|s| !s.index.is_defined()).count();
        context.counters.pairs_scored += context.scored.len();
        context.counters.pairs_undefined += undefined;

        info!(
            "Reduce phase scored {} pairs ({} undefined)",
            context.scored.len(),
            undefined
        );
        Ok(PhaseResult {
            phase_type: PhaseType::Reduce,
            metrics: PhaseMetrics {
                duration_secs: start.elapsed().as_secs_f64(),
                items_processed: reducers,
                items_successful: reducers,
            },
        })
    }

    fn phase_type(&self) -> PhaseType {
        PhaseType::Reduce
    }
}
