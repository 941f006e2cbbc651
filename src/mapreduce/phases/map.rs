//! Map phase: per-partition contingency accumulation
//!
//! Each input partition is consumed by one `PartitionAccumulator`, which
//! owns one matrix per declared attribute pair and emits every matrix
//! exactly once when the partition ends. A partition therefore contributes
//! at most one message per pair to the shuffle, however many records it
//! holds.

use super::{PhaseContext, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType};
use crate::mapreduce::counters::JobCounters;
use crate::mapreduce::errors::{MapReduceError, MapReduceResult};
use crate::mapreduce::input::{read_split, InputSplit};
use crate::mapreduce::plan::JobPlan;
use crate::mapreduce::{AttributePair, KeyedPartial};
use crate::matrix::ContingencyMatrix;
use crate::schema::CategoryIndexer;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, trace, warn};

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Every declared pair was incremented
    Counted,
    /// Some pairs were skipped because of unrecognized category values
    Partial { skipped_pairs: usize },
    /// The record lacked fields and was discarded entirely
    Discarded,
}

/// Map-side accumulator for one partition
///
/// The matrices are owned exclusively by this accumulator and are never
/// shared with another partition.
pub struct PartitionAccumulator {
    plan: Arc<JobPlan>,
    // aligned with plan.pairs()
    matrices: Vec<ContingencyMatrix>,
    counters: JobCounters,
    resolved: Vec<Option<usize>>,
}

impl PartitionAccumulator {
    /// Allocate one zero matrix per declared pair
    pub fn setup(plan: Arc<JobPlan>) -> Self {
        let matrices = plan
            .pairs()
            .iter()
            .map(|spec| ContingencyMatrix::new(spec.rows, spec.cols))
            .collect();
        let resolved = vec![None; plan.attributes().len()];
        Self {
            plan,
            matrices,
            counters: JobCounters::default(),
            resolved,
        }
    }

    /// Consume one record
    ///
    /// A value that is not a category of its field skips only the pairs
    /// using that field; the other pairs of the record are still counted.
    /// A record too short to contain every used field is discarded.
    pub fn process(&mut self, record: &str) -> MapReduceResult<RecordOutcome> {
        self.counters.records_read += 1;

        let record = record.trim_end_matches(['\r', '\n']);
        let fields = self.plan.split_record(record);
        if fields.len() < self.plan.min_fields() {
            self.counters.records_malformed += 1;
            debug!(
                "Discarding record with {} fields (need {}): {:?}",
                fields.len(),
                self.plan.min_fields(),
                record
            );
            return Ok(RecordOutcome::Discarded);
        }

        for (slot, field) in self.plan.attributes().iter().enumerate() {
            let value = fields[field.ordinal()];
            self.resolved[slot] = match field.category_index(value) {
                Ok(index) => Some(index),
                Err(e) => {
                    self.counters.unrecognized_values += 1;
                    trace!("{}", e);
                    None
                }
            };
        }

        let mut skipped_pairs = 0;
        for (spec, matrix) in self.plan.pairs().iter().zip(self.matrices.iter_mut()) {
            match (self.resolved[spec.source_slot], self.resolved[spec.dest_slot]) {
                (Some(row), Some(col)) => {
                    matrix.increment(row, col)?;
                    self.counters.pair_increments += 1;
                }
                _ => {
                    self.counters.record_skip(&spec.key);
                    skipped_pairs += 1;
                }
            }
        }

        if skipped_pairs == 0 {
            Ok(RecordOutcome::Counted)
        } else {
            Ok(RecordOutcome::Partial { skipped_pairs })
        }
    }

    /// Consume one raw input line
    ///
    /// A line that is not valid UTF-8 cannot be split into fields and is
    /// discarded like a short record.
    pub fn process_bytes(&mut self, line: &[u8]) -> MapReduceResult<RecordOutcome> {
        match std::str::from_utf8(line) {
            Ok(record) => self.process(record),
            Err(e) => {
                self.counters.records_read += 1;
                self.counters.records_malformed += 1;
                debug!("Discarding record that is not valid UTF-8: {}", e);
                Ok(RecordOutcome::Discarded)
            }
        }
    }

    /// Current matrix for `key`
    pub fn matrix(&self, key: &AttributePair) -> Option<&ContingencyMatrix> {
        self.plan
            .pairs()
            .iter()
            .position(|spec| spec.key == *key)
            .map(|idx| &self.matrices[idx])
    }

    pub fn counters(&self) -> &JobCounters {
        &self.counters
    }

    /// Emit every matrix once, in declaration order
    pub fn finish(self) -> (Vec<KeyedPartial>, JobCounters) {
        let emitted = self
            .plan
            .pairs()
            .iter()
            .zip(self.matrices)
            .map(|(spec, matrix)| {
                trace!("Emitting pair {}: {}", spec.key, matrix);
                KeyedPartial {
                    key: spec.key,
                    value: matrix.serialize(),
                }
            })
            .collect();
        let mut counters = self.counters;
        counters.partitions = 1;
        (emitted, counters)
    }
}

/// Everything one partition hands to the shuffle
#[derive(Debug, Clone)]
pub struct PartitionOutput {
    pub partition: usize,
    pub emitted: Vec<KeyedPartial>,
    pub counters: JobCounters,
}

/// Pure: Accumulate `records` into one partial matrix per declared pair
pub fn accumulate<'a, I>(plan: Arc<JobPlan>, records: I) -> MapReduceResult<(Vec<KeyedPartial>, JobCounters)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut accumulator = PartitionAccumulator::setup(plan);
    for record in records {
        accumulator.process(record)?;
    }
    Ok(accumulator.finish())
}

fn accumulate_split(plan: Arc<JobPlan>, split: InputSplit) -> MapReduceResult<PartitionOutput> {
    let start = Instant::now();
    let mut accumulator = PartitionAccumulator::setup(plan);
    read_split(&split, |line| accumulator.process_bytes(line).map(|_| ()))?;
    let (emitted, counters) = accumulator.finish();
    debug!(
        "Partition {} ({} records from {}) finished in {:?}",
        split.index,
        counters.records_read,
        split.source.display(),
        start.elapsed()
    );
    Ok(PartitionOutput {
        partition: split.index,
        emitted,
        counters,
    })
}

fn joined_output(
    joined: Result<MapReduceResult<PartitionOutput>, JoinError>,
) -> MapReduceResult<PartitionOutput> {
    joined.map_err(|e| MapReduceError::TaskFailed {
        phase: PhaseType::Map,
        message: e.to_string(),
    })?
}

/// Executor for the map phase
pub struct MapPhaseExecutor {
    max_parallel: usize,
}

impl MapPhaseExecutor {
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
        }
    }

    /// Run `task` on every split, at most `max_parallel` at a time
    ///
    /// A permit is released only once its task's result has been seen, so
    /// a failed partition stops the loop before another split is spawned.
    async fn run_partitions<F>(&self, splits: Vec<InputSplit>, task: F) -> MapReduceResult<Vec<PartitionOutput>>
    where
        F: Fn(InputSplit) -> MapReduceResult<PartitionOutput> + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let task = Arc::new(task);
        let mut futures = FuturesUnordered::new();
        let mut outputs = Vec::new();

        for split in splits {
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = futures.next(), if !futures.is_empty() => {
                        outputs.push(joined_output(joined)?);
                    }
                    permit = semaphore.clone().acquire_owned() => {
                        break permit.map_err(|e| MapReduceError::TaskFailed {
                            phase: PhaseType::Map,
                            message: e.to_string(),
                        })?;
                    }
                }
            };
            let task = task.clone();
            let handle = tokio::task::spawn_blocking(move || (*task)(split));
            futures.push(async move {
                let joined = handle.await;
                drop(permit);
                joined
            });
        }

        while let Some(joined) = futures.next().await {
            outputs.push(joined_output(joined)?);
        }

        // completion order is arbitrary; partition order keeps the shuffle reproducible
        outputs.sort_by_key(|o| o.partition);
        Ok(outputs)
    }
}

#[async_trait]
impl PhaseExecutor for MapPhaseExecutor {
    async fn execute(&self, context: &mut PhaseContext) -> MapReduceResult<PhaseResult> {
        let start = Instant::now();
        let splits = std::mem::take(&mut context.splits);
        let partitions = splits.len();
        info!(
            "Starting map phase with {} partitions (max parallel: {})",
            partitions, self.max_parallel
        );

        let plan = context.plan.clone();
        let outputs = self
            .run_partitions(splits, move |split| accumulate_split(plan.clone(), split))
            .await?;

        let mut counters = JobCounters::default();
        for output in outputs {
            counters.merge(&output.counters);
            context.map_output.extend(output.emitted);
        }

        if counters.records_malformed > 0 {
            warn!("Discarded {} malformed records", counters.records_malformed);
        }
        if counters.unrecognized_values > 0 {
            warn!(
                "Found {} unrecognized category values; {} pair increments skipped",
                counters.unrecognized_values,
                counters.total_skipped()
            );
        }

        let metrics = PhaseMetrics {
            duration_secs: start.elapsed().as_secs_f64(),
            items_processed: partitions,
            items_successful: partitions,
        };
        context.counters.merge(&counters);

        info!(
            "Map phase emitted {} partial matrices from {} records",
            context.map_output.len(),
            counters.records_read
        );
        Ok(PhaseResult {
            phase_type: PhaseType::Map,
            metrics,
        })
    }

    fn phase_type(&self) -> PhaseType {
        PhaseType::Map
    }
}
