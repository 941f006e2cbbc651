//! Pure functions for merging partial matrices
//!
//! These functions turn the serialized partial matrices delivered for one
//! attribute pair into the final merged matrix.

use crate::mapreduce::errors::{MapReduceError, MapReduceResult};
use crate::mapreduce::AttributePair;
use crate::matrix::{parallel_merge, ContingencyMatrix, MatrixError};

/// Partial counts above which merging switches to rayon
///
/// A handful of partials merge faster sequentially than the thread pool
/// can be woken up.
pub const PARALLEL_MERGE_THRESHOLD: usize = 1024;

/// Decode every serialized partial matrix for `key`
///
/// # Arguments
///
/// * `key` - Attribute pair the partials belong to
/// * `values` - Serialized partials in arrival order
///
/// # Returns
///
/// The decoded matrices in the same order, or `MalformedPartial` naming
/// the first value that failed to decode
pub fn decode_partials(
    key: AttributePair,
    values: &[String],
) -> MapReduceResult<Vec<ContingencyMatrix>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            ContingencyMatrix::deserialize(value).map_err(|source| {
                MapReduceError::MalformedPartial {
                    pair: key,
                    index,
                    source,
                }
            })
        })
        .collect()
}

/// Merge serialized partial matrices into one `rows × cols` matrix
///
/// Starts from a zero matrix and merges the partials in arrival order. Any
/// partial of a different shape aborts the merge with `SchemaMismatch`;
/// nothing is truncated or padded.
pub fn merge_partials(
    key: AttributePair,
    rows: usize,
    cols: usize,
    values: &[String],
) -> MapReduceResult<ContingencyMatrix> {
    let partials = decode_partials(key, values)?;
    merge_matrices(key, rows, cols, partials)
}

/// Merge already decoded partials into one `rows × cols` matrix
pub fn merge_matrices(
    key: AttributePair,
    rows: usize,
    cols: usize,
    partials: Vec<ContingencyMatrix>,
) -> MapReduceResult<ContingencyMatrix> {
    let to_pair_error = |source: MatrixError| match source {
        MatrixError::SchemaMismatch { .. } => MapReduceError::SchemaMismatch { pair: key, source },
        other => MapReduceError::Matrix(other),
    };

    if partials.len() > PARALLEL_MERGE_THRESHOLD {
        return parallel_merge(rows, cols, partials).map_err(to_pair_error);
    }

    partials
        .iter()
        .try_fold(ContingencyMatrix::new(rows, cols), |acc, partial| {
            acc.merged(partial)
        })
        .map_err(to_pair_error)
}
