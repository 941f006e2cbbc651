//! Phase execution for the correlation job
//!
//! The job runs as a fixed sequence of phases:
//!
//! ```text
//! [Setup] → [Map] → [Reduce] → [Complete]
//!    ↓        ↓        ↓
//! [Error] ← [Error] ← [Error]
//! ```
//!
//! - **Setup** reads the input files and splits them into partitions.
//! - **Map** accumulates one partial matrix per declared pair per partition.
//! - **Reduce** merges the partials of each pair and scores the result.
//!
//! Any phase error aborts the job. Per-record problems are not phase
//! errors; they are counted in [`JobCounters`] and the job carries on.

pub mod coordinator;
pub mod map;
pub mod reduce;
pub mod setup;

use super::counters::JobCounters;
use super::errors::MapReduceResult;
use super::input::InputSplit;
use super::plan::JobPlan;
use super::{KeyedPartial, ScoredPair};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub use coordinator::PhaseCoordinator;
pub use map::{accumulate, MapPhaseExecutor, PartitionAccumulator, RecordOutcome};
pub use reduce::{PairAggregator, ReducePhaseExecutor};
pub use setup::SetupPhaseExecutor;

/// Type of phase in the job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseType {
    /// Input splitting
    Setup,
    /// Per-partition accumulation
    Map,
    /// Per-pair merge and scoring
    Reduce,
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseType::Setup => write!(f, "Setup"),
            PhaseType::Map => write!(f, "Map"),
            PhaseType::Reduce => write!(f, "Reduce"),
        }
    }
}

/// Result from executing a phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase_type: PhaseType,
    pub metrics: PhaseMetrics,
}

/// Metrics collected during phase execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseMetrics {
    /// Duration in seconds
    pub duration_secs: f64,
    /// Number of items processed
    pub items_processed: usize,
    /// Number of successful items
    pub items_successful: usize,
}

/// State handed from phase to phase
#[derive(Debug)]
pub struct PhaseContext {
    /// Resolved job plan, shared read-only with every worker
    pub plan: Arc<JobPlan>,
    /// Input files or directories to split
    pub inputs: Vec<PathBuf>,
    /// Partitions produced by the setup phase
    pub splits: Vec<InputSplit>,
    /// Keyed partial matrices produced by the map phase
    pub map_output: Vec<KeyedPartial>,
    /// Scored pairs produced by the reduce phase, in key order
    pub scored: Vec<ScoredPair>,
    /// Part files written by the reduce phase
    pub part_files: Vec<PathBuf>,
    pub counters: JobCounters,
}

impl PhaseContext {
    pub fn new(plan: Arc<JobPlan>) -> Self {
        Self {
            plan,
            inputs: Vec::new(),
            splits: Vec::new(),
            map_output: Vec::new(),
            scored: Vec::new(),
            part_files: Vec::new(),
            counters: JobCounters::default(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_splits(mut self, splits: Vec<InputSplit>) -> Self {
        self.splits = splits;
        self
    }
}

/// Executes one phase of the job
#[async_trait]
pub trait PhaseExecutor: Send + Sync {
    /// Execute the phase
    async fn execute(&self, context: &mut PhaseContext) -> MapReduceResult<PhaseResult>;

    /// Get the phase type
    fn phase_type(&self) -> PhaseType;

    /// Validate the context before execution
    fn validate_context(&self, _context: &PhaseContext) -> MapReduceResult<()> {
        Ok(())
    }
}
