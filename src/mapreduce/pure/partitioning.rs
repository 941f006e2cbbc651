//! Pure key partitioning for the shuffle

use crate::mapreduce::AttributePair;

/// Pure: Reducer responsible for `key`
///
/// Every value for a key lands on the same reducer. The hash only depends
/// on the two ordinals, so assignment is stable across runs and machines.
pub fn partition_for(key: &AttributePair, num_reducers: usize) -> usize {
    if num_reducers <= 1 {
        return 0;
    }
    let hash = key.source.wrapping_mul(31).wrapping_add(key.dest);
    hash % num_reducers
}
