//! Setup phase: scan the inputs and cut them into partitions

use super::{PhaseContext, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType};
use crate::mapreduce::errors::{MapReduceError, MapReduceResult};
use crate::mapreduce::input::load_splits;
use async_trait::async_trait;
use std::time::Instant;
use tracing::info;

pub struct SetupPhaseExecutor {
    split_size: usize,
}

impl SetupPhaseExecutor {
    pub fn new(split_size: usize) -> Self {
        Self { split_size }
    }
}

#[async_trait]
impl PhaseExecutor for SetupPhaseExecutor {
    async fn execute(&self, context: &mut PhaseContext) -> MapReduceResult<PhaseResult> {
        let start = Instant::now();
        context.splits = load_splits(&context.inputs, self.split_size).await?;
        let records: usize = context.splits.iter().map(|s| s.records).sum();
        info!(
            "Setup produced {} partitions holding {} records",
            context.splits.len(),
            records
        );

        Ok(PhaseResult {
            phase_type: PhaseType::Setup,
            metrics: PhaseMetrics {
                duration_secs: start.elapsed().as_secs_f64(),
                items_processed: context.inputs.len(),
                items_successful: context.inputs.len(),
            },
        })
    }

    fn phase_type(&self) -> PhaseType {
        PhaseType::Setup
    }

    fn validate_context(&self, context: &PhaseContext) -> MapReduceResult<()> {
        if context.inputs.is_empty() {
            return Err(MapReduceError::invalid_config(
                "input",
                "[]",
                "at least one input path is required",
            ));
        }
        Ok(())
    }
}
