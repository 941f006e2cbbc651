//! Keys and values exchanged between the map and reduce phases

use crate::matrix::CramerIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered `(source, destination)` attribute ordinals
///
/// Identifies exactly one contingency matrix across the whole job and is
/// the shuffle key between the phases. Equality, hashing and ordering are
/// by the two ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributePair {
    pub source: usize,
    pub dest: usize,
}

impl AttributePair {
    pub fn new(source: usize, dest: usize) -> Self {
        Self { source, dest }
    }
}

impl fmt::Display for AttributePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.source, self.dest)
    }
}

impl FromStr for AttributePair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, dest) = s
            .split_once(',')
            .ok_or_else(|| format!("attribute pair '{}' must look like 'src,dst'", s))?;
        let source = source
            .trim()
            .parse()
            .map_err(|e| format!("invalid source ordinal in '{}': {}", s, e))?;
        let dest = dest
            .trim()
            .parse()
            .map_err(|e| format!("invalid destination ordinal in '{}': {}", s, e))?;
        Ok(Self { source, dest })
    }
}

/// One map output record: a serialized partial matrix under its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedPartial {
    pub key: AttributePair,
    pub value: String,
}

/// Final result for one attribute pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub key: AttributePair,
    pub source_name: String,
    pub dest_name: String,
    pub total: u64,
    pub index: CramerIndex,
}
