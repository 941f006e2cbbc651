//! Pure attribute pair declaration

use crate::mapreduce::AttributePair;
use std::collections::HashSet;

/// Pure: Declare every attribute pair in emission order
///
/// Iterates source ordinals in the outer loop and destination ordinals in
/// the inner loop, skipping self-pairs. A pair named twice by repeated
/// ordinals is declared once, at its first position.
///
/// This function is pure and deterministic - same inputs always produce same outputs.
pub fn declare_pairs(sources: &[usize], dests: &[usize]) -> Vec<AttributePair> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .flat_map(|&src| dests.iter().map(move |&dst| AttributePair::new(src, dst)))
        .filter(|pair| pair.source != pair.dest)
        .filter(|pair| seen.insert(*pair))
        .collect()
}

/// Pure: Distinct ordinals used by `pairs`, in first-use order
pub fn used_ordinals(pairs: &[AttributePair]) -> Vec<usize> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .flat_map(|pair| [pair.source, pair.dest])
        .filter(|ordinal| seen.insert(*ordinal))
        .collect()
}
