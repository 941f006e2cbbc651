//! Pure functional utilities for the correlation job
//!
//! This module contains pure functions extracted from the phase executors
//! to improve testability, reusability, and maintainability.

pub mod aggregation;
pub mod formatting;
pub mod pairs;
pub mod partitioning;

pub use aggregation::{decode_partials, merge_matrices, merge_partials};
pub use formatting::{format_output_line, format_score, UNDEFINED_SCORE};
pub use pairs::{declare_pairs, used_ordinals};
pub use partitioning::partition_for;
