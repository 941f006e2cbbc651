//! Distributed correlation job
//!
//! The job computes Cramer's V for every declared pair of categorical
//! attributes. Input is cut into partitions; each partition accumulates
//! one contingency matrix per pair and emits it keyed by the pair. The
//! shuffle routes all partials of a pair to one reducer, which merges them
//! and scores the result.
//!
//! ```text
//! records ─▶ PartitionAccumulator ─▶ (pair, "r,c,counts…") ─▶ shuffle
//!                                                               │
//!          part-r-NNNNN ◀─ output line ◀─ PairAggregator ◀──────┘
//! ```

pub mod counters;
pub mod errors;
pub mod input;
pub mod output;
pub mod phases;
pub mod plan;
pub mod pure;
pub mod runner;
pub mod shuffle;
pub mod types;

pub use counters::JobCounters;
pub use errors::{MapReduceError, MapReduceResult};
pub use phases::{accumulate, PairAggregator, PartitionAccumulator, PhaseType, RecordOutcome};
pub use plan::{JobPlan, PairSpec};
pub use runner::{CorrelationJob, JobReport, JobSummary, RunOptions};
pub use types::{AttributePair, KeyedPartial, ScoredPair};
