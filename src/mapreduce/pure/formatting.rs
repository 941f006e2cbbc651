//! Pure functions for formatting job output
//!
//! Scores are printed as fixed-point integers: with scale `s > 1` the
//! printed value is `round(V * s)` using `f64::round` (half away from
//! zero), so the default scale of 1000 prints `0.5` as `500`. A scale of 1
//! prints the raw value with six decimals. An undefined statistic always
//! prints [`UNDEFINED_SCORE`].

use crate::mapreduce::ScoredPair;
use crate::matrix::CramerIndex;

/// Marker printed when Cramer's V is undefined for a pair
pub const UNDEFINED_SCORE: &str = "undefined";

/// Format a score according to the configured scale
pub fn format_score(index: &CramerIndex, scale: u32) -> String {
    match index.value() {
        None => UNDEFINED_SCORE.to_string(),
        Some(value) if scale <= 1 => format!("{:.6}", value),
        Some(value) => format!("{}", (value * f64::from(scale)).round() as u64),
    }
}

/// Format one output line: `source<delim>dest<delim>score`
pub fn format_output_line(scored: &ScoredPair, delimiter: &str, scale: u32) -> String {
    format!(
        "{}{delim}{}{delim}{}",
        scored.source_name,
        scored.dest_name,
        format_score(&scored.index, scale),
        delim = delimiter
    )
}
