//! Immutable job plan shared by every worker
//!
//! The plan resolves the configuration against the feature schema once:
//! which pairs are declared and in what order, the fields behind each
//! ordinal, the matrix shape of every pair, and how to split records.
//! Workers only ever read it.

use super::errors::{MapReduceError, MapReduceResult};
use super::pure::{declare_pairs, used_ordinals};
use super::AttributePair;
use crate::config::JobConfig;
use crate::schema::{CategoryIndexer, FeatureField, FeatureSchema};
use regex::Regex;
use std::collections::HashMap;

/// One declared attribute pair with its resolved fields
#[derive(Debug, Clone)]
pub struct PairSpec {
    pub key: AttributePair,
    /// Position of the source field in [`JobPlan::attributes`]
    pub source_slot: usize,
    /// Position of the destination field in [`JobPlan::attributes`]
    pub dest_slot: usize,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone)]
pub struct JobPlan {
    attributes: Vec<FeatureField>,
    pairs: Vec<PairSpec>,
    by_key: HashMap<AttributePair, usize>,
    record_splitter: Regex,
    output_delimiter: String,
    correlation_scale: u32,
    num_reducers: usize,
    min_fields: usize,
}

impl JobPlan {
    /// Resolve `config` against `schema`
    ///
    /// Fails if no pair is declared, if the reducer count or scale is zero,
    /// if an ordinal is missing from the schema or is not categorical, or if
    /// the delimiter regex is invalid.
    pub fn resolve(config: &JobConfig, schema: &FeatureSchema) -> MapReduceResult<Self> {
        let keys = declare_pairs(&config.source_attributes, &config.dest_attributes);
        if keys.is_empty() {
            return Err(MapReduceError::invalid_config(
                "source_attributes/dest_attributes",
                format!("{:?} x {:?}", config.source_attributes, config.dest_attributes),
                "no attribute pair declared",
            ));
        }
        if config.num_reducers == 0 {
            return Err(MapReduceError::invalid_config(
                "num_reducers",
                config.num_reducers,
                "must be greater than 0",
            ));
        }
        if config.correlation_scale == 0 {
            return Err(MapReduceError::invalid_config(
                "correlation_scale",
                config.correlation_scale,
                "must be greater than 0",
            ));
        }

        let record_splitter = Regex::new(&config.field_delim_regex).map_err(|e| {
            MapReduceError::invalid_config("field_delim_regex", &config.field_delim_regex, e.to_string())
        })?;

        let ordinals = used_ordinals(&keys);
        let attributes = ordinals
            .iter()
            .map(|&ordinal| schema.categorical_field(ordinal).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let slot_of: HashMap<usize, usize> = ordinals
            .iter()
            .enumerate()
            .map(|(slot, &ordinal)| (ordinal, slot))
            .collect();

        let pairs: Vec<PairSpec> = keys
            .iter()
            .map(|&key| {
                let source_slot = slot_of[&key.source];
                let dest_slot = slot_of[&key.dest];
                PairSpec {
                    key,
                    source_slot,
                    dest_slot,
                    rows: attributes[source_slot].cardinality(),
                    cols: attributes[dest_slot].cardinality(),
                }
            })
            .collect();

        let by_key = pairs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.key, idx))
            .collect();

        let min_fields = ordinals.iter().max().map(|&m| m + 1).unwrap_or(0);

        Ok(Self {
            attributes,
            pairs,
            by_key,
            record_splitter,
            output_delimiter: config.field_delim_out.clone(),
            correlation_scale: config.correlation_scale,
            num_reducers: config.num_reducers,
            min_fields,
        })
    }

    /// Declared pairs in emission order
    pub fn pairs(&self) -> &[PairSpec] {
        &self.pairs
    }

    pub fn pair(&self, key: &AttributePair) -> Option<&PairSpec> {
        self.by_key.get(key).map(|&idx| &self.pairs[idx])
    }

    /// Distinct fields used by any pair
    pub fn attributes(&self) -> &[FeatureField] {
        &self.attributes
    }

    pub fn source_field(&self, spec: &PairSpec) -> &FeatureField {
        &self.attributes[spec.source_slot]
    }

    pub fn dest_field(&self, spec: &PairSpec) -> &FeatureField {
        &self.attributes[spec.dest_slot]
    }

    /// Split a record into its fields
    pub fn split_record<'a>(&self, record: &'a str) -> Vec<&'a str> {
        self.record_splitter.split(record).collect()
    }

    /// Number of fields a record needs to cover every used ordinal
    pub fn min_fields(&self) -> usize {
        self.min_fields
    }

    pub fn output_delimiter(&self) -> &str {
        &self.output_delimiter
    }

    pub fn correlation_scale(&self) -> u32 {
        self.correlation_scale
    }

    pub fn num_reducers(&self) -> usize {
        self.num_reducers
    }
}
