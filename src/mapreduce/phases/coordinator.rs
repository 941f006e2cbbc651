//! Phase coordinator
//!
//! Runs setup, map and reduce in order on one shared [`PhaseContext`].
//! The first phase error stops the job; later phases never see a context
//! left half-built by a failed phase.

use super::{
    MapPhaseExecutor, PhaseContext, PhaseExecutor, PhaseResult, ReducePhaseExecutor,
    SetupPhaseExecutor,
};
use crate::mapreduce::errors::MapReduceResult;
use std::path::PathBuf;
use tracing::{info, warn};

/// Coordinates the execution of the job's phases
pub struct PhaseCoordinator {
    setup_executor: Box<dyn PhaseExecutor>,
    map_executor: Box<dyn PhaseExecutor>,
    reduce_executor: Box<dyn PhaseExecutor>,
}

impl PhaseCoordinator {
    /// Build the standard three-phase pipeline
    pub fn new(split_size: usize, max_parallel_mappers: usize, output_dir: Option<PathBuf>) -> Self {
        let reduce = match output_dir {
            Some(dir) => ReducePhaseExecutor::with_output_dir(dir),
            None => ReducePhaseExecutor::new(),
        };
        Self {
            setup_executor: Box::new(SetupPhaseExecutor::new(split_size)),
            map_executor: Box::new(MapPhaseExecutor::new(max_parallel_mappers)),
            reduce_executor: Box::new(reduce),
        }
    }

    /// Build a pipeline from arbitrary executors
    pub fn from_executors(
        setup_executor: Box<dyn PhaseExecutor>,
        map_executor: Box<dyn PhaseExecutor>,
        reduce_executor: Box<dyn PhaseExecutor>,
    ) -> Self {
        Self {
            setup_executor,
            map_executor,
            reduce_executor,
        }
    }

    /// Run every phase, returning the result of each in order
    pub async fn execute_job(&self, context: &mut PhaseContext) -> MapReduceResult<Vec<PhaseResult>> {
        let mut results = Vec::with_capacity(3);
        for executor in [
            self.setup_executor.as_ref(),
            self.map_executor.as_ref(),
            self.reduce_executor.as_ref(),
        ] {
            results.push(self.execute_phase(executor, context).await?);
        }
        Ok(results)
    }

    async fn execute_phase(
        &self,
        executor: &dyn PhaseExecutor,
        context: &mut PhaseContext,
    ) -> MapReduceResult<PhaseResult> {
        let phase_type = executor.phase_type();
        executor.validate_context(context)?;

        info!("Starting execution of {} phase", phase_type);
        let start_time = std::time::Instant::now();

        let result = executor.execute(context).await.inspect_err(|e| {
            warn!("{} phase failed: {}", phase_type, e);
        })?;

        info!(
            "{} phase completed in {:.2}s",
            phase_type,
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }
}
