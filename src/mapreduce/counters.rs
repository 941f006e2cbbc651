//! Job counters
//!
//! Per-record problems never abort a partition; they are counted here so
//! they stay observable. Counters from different partitions merge by
//! addition.

use super::AttributePair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    /// Partitions processed by the map phase
    pub partitions: usize,
    /// Records consumed
    pub records_read: u64,
    /// Records discarded for lacking a field some pair needs
    pub records_malformed: u64,
    /// Field values that matched no declared category
    pub unrecognized_values: u64,
    /// Matrix cells incremented
    pub pair_increments: u64,
    /// Per pair (`"src,dst"`), increments skipped because of an
    /// unrecognized value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skipped_increments: BTreeMap<String, u64>,
    /// Pairs scored by the reduce phase
    pub pairs_scored: usize,
    /// Pairs whose statistic was undefined
    pub pairs_undefined: usize,
}

impl JobCounters {
    pub fn record_skip(&mut self, pair: &AttributePair) {
        *self.skipped_increments.entry(pair.to_string()).or_default() += 1;
    }

    pub fn skipped_for(&self, pair: &AttributePair) -> u64 {
        self.skipped_increments
            .get(&pair.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped_increments.values().sum()
    }

    /// Add every counter of `other` into `self`
    pub fn merge(&mut self, other: &JobCounters) {
        self.partitions += other.partitions;
        self.records_read += other.records_read;
        self.records_malformed += other.records_malformed;
        self.unrecognized_values += other.unrecognized_values;
        self.pair_increments += other.pair_increments;
        for (pair, count) in &other.skipped_increments {
            *self.skipped_increments.entry(pair.clone()).or_default() += count;
        }
        self.pairs_scored += other.pairs_scored;
        self.pairs_undefined += other.pairs_undefined;
    }
}
