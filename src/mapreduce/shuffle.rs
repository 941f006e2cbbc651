//! Shuffle: route keyed partials to reducers
//!
//! Every value for a key lands in the same reducer bucket, grouped under
//! the key. Values keep their map-side order (partition order), so a run
//! over the same input always merges partials in the same sequence.

use super::plan::JobPlan;
use super::pure::partition_for;
use super::{AttributePair, KeyedPartial};
use std::collections::BTreeMap;
use tracing::debug;

/// Everything one reducer consumes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducerInput {
    pub reducer: usize,
    /// Serialized partials grouped by key, keys in ascending order
    pub groups: BTreeMap<AttributePair, Vec<String>>,
}

impl ReducerInput {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn value_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Group `map_output` into exactly `num_reducers` buckets
///
/// Every declared pair gets a group even when no partition emitted it, so
/// an empty input still produces one (undefined) result per pair.
pub fn shuffle(plan: &JobPlan, map_output: Vec<KeyedPartial>) -> Vec<ReducerInput> {
    let num_reducers = plan.num_reducers().max(1);
    let mut buckets: Vec<ReducerInput> = (0..num_reducers)
        .map(|reducer| ReducerInput {
            reducer,
            groups: BTreeMap::new(),
        })
        .collect();

    for spec in plan.pairs() {
        buckets[partition_for(&spec.key, num_reducers)]
            .groups
            .entry(spec.key)
            .or_default();
    }

    for partial in map_output {
        buckets[partition_for(&partial.key, num_reducers)]
            .groups
            .entry(partial.key)
            .or_default()
            .push(partial.value);
    }

    for bucket in &buckets {
        debug!(
            "Reducer {} receives {} keys ({} partials)",
            bucket.reducer,
            bucket.groups.len(),
            bucket.value_count()
        );
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapreduce::plan::tests::{config, SCHEMA};
    use crate::schema::FeatureSchema;

    fn plan_with_reducers(num_reducers: usize) -> JobPlan {
        let schema = FeatureSchema::from_json(SCHEMA).unwrap();
        let mut cfg = config(&[1, 2], &[2, 3]);
        cfg.num_reducers = num_reducers;
        JobPlan::resolve(&cfg, &schema).unwrap()
    }

    fn partial(source: usize, dest: usize, value: &str) -> KeyedPartial {
        KeyedPartial {
            key: AttributePair::new(source, dest),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_values_grouped_in_arrival_order() {
        let plan = plan_with_reducers(1);
        let buckets = shuffle(
            &plan,
            vec![
                partial(1, 2, "a"),
                partial(2, 3, "b"),
                partial(1, 2, "c"),
            ],
        );
        assert_eq!(buckets.len(), 1);
        let groups = &buckets[0].groups;
        assert_eq!(groups[&AttributePair::new(1, 2)], vec!["a", "c"]);
        assert_eq!(groups[&AttributePair::new(2, 3)], vec!["b"]);
        assert!(groups[&AttributePair::new(1, 3)].is_empty());
    }

    #[test]
    fn test_each_key_on_exactly_one_reducer() {
        let plan = plan_with_reducers(3);
        let buckets = shuffle(&plan, vec![partial(1, 2, "a"), partial(1, 3, "b")]);
        assert_eq!(buckets.len(), 3);

        for spec in plan.pairs() {
            let holders: Vec<_> = buckets
                .iter()
                .filter(|b| b.groups.contains_key(&spec.key))
                .map(|b| b.reducer)
                .collect();
            assert_eq!(holders, vec![partition_for(&spec.key, 3)]);
        }
    }

    #[test]
    fn test_empty_map_output_still_seeds_declared_pairs() {
        let plan = plan_with_reducers(2);
        let buckets = shuffle(&plan, Vec::new());
        let keys: usize = buckets.iter().map(|b| b.groups.len()).sum();
        assert_eq!(keys, 3);
        assert_eq!(buckets.iter().map(ReducerInput::value_count).sum::<usize>(), 0);
    }
}
