//! Contingency matrix for one attribute pair
//!
//! A `ContingencyMatrix` is a dense `rows × cols` table of co-occurrence
//! counts. Rows are the source attribute's categories, columns the
//! destination attribute's categories. The shape is fixed at construction.
//!
//! Merging is elementwise addition, so partial matrices built by any number
//! of partitions can be combined in any order and any grouping with the
//! same result.

pub mod codec;
pub mod cramer;

pub use cramer::{CramerIndex, UndefinedReason};

use rayon::prelude::*;
use thiserror::Error;

/// Errors raised by matrix operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("schema mismatch: expected {expected_rows}x{expected_cols} matrix, got {actual_rows}x{actual_cols}")]
    SchemaMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("cell ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("count overflow in cell ({row}, {col})")]
    CountOverflow { row: usize, col: usize },

    #[error("malformed serialized matrix: {reason}")]
    Malformed { reason: String },
}

/// Dense 2D table of non-negative co-occurrence counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyMatrix {
    rows: usize,
    cols: usize,
    // row-major
    counts: Vec<u64>,
}

impl ContingencyMatrix {
    /// Create a zero-filled matrix of the given shape
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            counts: vec![0; rows * cols],
        }
    }

    /// Build a matrix from nested rows, mostly useful in tests and tooling
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self, MatrixError> {
        let row_count = rows.len();
        let col_count = rows.first().map(Vec::len).unwrap_or(0);

        let mut counts = Vec::with_capacity(row_count * col_count);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != col_count {
                return Err(MatrixError::Malformed {
                    reason: format!(
                        "row {} has {} columns, expected {}",
                        i,
                        row.len(),
                        col_count
                    ),
                });
            }
            counts.extend_from_slice(row);
        }

        Ok(Self {
            rows: row_count,
            cols: col_count,
            counts,
        })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, counts: Vec<u64>) -> Self {
        debug_assert_eq!(counts.len(), rows * cols);
        Self { rows, cols, counts }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Count stored at `(row, col)`, or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        if row < self.rows && col < self.cols {
            Some(self.counts[row * self.cols + col])
        } else {
            None
        }
    }

    /// Row-major view of every count
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Add one observation at `(row, col)`
    pub fn increment(&mut self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::CellOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cell = &mut self.counts[row * self.cols + col];
        *cell = cell
            .checked_add(1)
            .ok_or(MatrixError::CountOverflow { row, col })?;
        Ok(())
    }

    /// Add every cell of `other` into `self`
    ///
    /// Both matrices must have the same shape. A mismatch means the two
    /// sides were built from different schemas and is never recoverable.
    pub fn merge(&mut self, other: &ContingencyMatrix) -> Result<(), MatrixError> {
        self.ensure_shape(other.rows, other.cols)?;

        for (idx, (cell, add)) in self.counts.iter_mut().zip(&other.counts).enumerate() {
            *cell = cell.checked_add(*add).ok_or(MatrixError::CountOverflow {
                row: idx / self.cols,
                col: idx % self.cols,
            })?;
        }
        Ok(())
    }

    /// Consuming variant of [`merge`](Self::merge)
    pub fn merged(mut self, other: &ContingencyMatrix) -> Result<Self, MatrixError> {
        self.merge(other)?;
        Ok(self)
    }

    /// Fail with `SchemaMismatch` unless this matrix is `rows × cols`
    pub fn ensure_shape(&self, rows: usize, cols: usize) -> Result<(), MatrixError> {
        if self.rows != rows || self.cols != cols {
            return Err(MatrixError::SchemaMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                actual_rows: rows,
                actual_cols: cols,
            });
        }
        Ok(())
    }

    /// Sum of every cell
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        if self.cols == 0 {
            return vec![0; self.rows];
        }
        self.counts
            .chunks(self.cols)
            .map(|row| row.iter().sum())
            .collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.cols];
        if self.cols == 0 {
            return totals;
        }
        for row in self.counts.chunks(self.cols) {
            for (total, count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }
}

/// Merge many partial matrices of shape `rows × cols` in parallel
///
/// Integer addition is associative and commutative, so the rayon reduction
/// tree yields exactly the matrix a sequential fold would.
pub fn parallel_merge(
    rows: usize,
    cols: usize,
    partials: Vec<ContingencyMatrix>,
) -> Result<ContingencyMatrix, MatrixError> {
    partials
        .into_par_iter()
        .map(|partial| ContingencyMatrix::new(rows, cols).merged(&partial))
        .try_reduce(
            || ContingencyMatrix::new(rows, cols),
            |acc, partial| acc.merged(&partial),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u64]]) -> ContingencyMatrix {
        let owned: Vec<Vec<u64>> = rows.iter().map(|r| r.to_vec()).collect();
        ContingencyMatrix::from_rows(&owned).unwrap()
    }

    #[test]
    fn test_new_matrix_is_zero_filled() {
        let m = ContingencyMatrix::new(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.counts().len(), 12);
        assert!(m.counts().iter().all(|&c| c == 0));
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn test_increment_adds_one() {
        let mut m = ContingencyMatrix::new(2, 3);
        m.increment(1, 2).unwrap();
        m.increment(1, 2).unwrap();
        m.increment(0, 0).unwrap();
        assert_eq!(m.get(1, 2), Some(2));
        assert_eq!(m.get(0, 0), Some(1));
        assert_eq!(m.get(0, 1), Some(0));
        assert_eq!(m.total(), 3);
    }

    #[test]
    fn test_increment_out_of_bounds() {
        let mut m = ContingencyMatrix::new(2, 2);
        let err = m.increment(2, 0).unwrap_err();
        assert!(matches!(err, MatrixError::CellOutOfBounds { row: 2, .. }));
        assert!(m.increment(0, 5).is_err());
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn test_merge_sums_cells() {
        let mut a = matrix(&[&[1, 2], &[3, 4]]);
        let b = matrix(&[&[10, 0], &[0, 10]]);
        a.merge(&b).unwrap();
        assert_eq!(a, matrix(&[&[11, 2], &[3, 14]]));
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = matrix(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = matrix(&[&[6, 5, 4], &[3, 2, 1]]);
        let ab = a.clone().merged(&b).unwrap();
        let ba = b.merged(&a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = matrix(&[&[1, 0], &[0, 1]]);
        let b = matrix(&[&[2, 3], &[5, 7]]);
        let c = matrix(&[&[11, 13], &[17, 19]]);
        let left = a.clone().merged(&b).unwrap().merged(&c).unwrap();
        let right = a.merged(&b.merged(&c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_shape_mismatch() {
        let mut a = ContingencyMatrix::new(2, 3);
        let b = ContingencyMatrix::new(3, 2);
        let err = a.merge(&b).unwrap_err();
        assert_eq!(
            err,
            MatrixError::SchemaMismatch {
                expected_rows: 2,
                expected_cols: 3,
                actual_rows: 3,
                actual_cols: 2,
            }
        );
    }

    #[test]
    fn test_totals() {
        let m = matrix(&[&[3, 1], &[1, 3], &[0, 2]]);
        assert_eq!(m.row_totals(), vec![4, 4, 2]);
        assert_eq!(m.col_totals(), vec![4, 6]);
        assert_eq!(m.total(), 10);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![1, 2], vec![3]];
        assert!(ContingencyMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_parallel_merge_matches_sequential() {
        let partials: Vec<_> = (0..64u64)
            .map(|i| matrix(&[&[i, 1], &[2, i % 3]]))
            .collect();

        let mut sequential = ContingencyMatrix::new(2, 2);
        for p in &partials {
            sequential.merge(p).unwrap();
        }

        let parallel = parallel_merge(2, 2, partials).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_parallel_merge_detects_mismatch() {
        let partials = vec![ContingencyMatrix::new(2, 2), ContingencyMatrix::new(2, 3)];
        assert!(matches!(
            parallel_merge(2, 2, partials),
            Err(MatrixError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_parallel_merge_empty() {
        let merged = parallel_merge(2, 2, Vec::new()).unwrap();
        assert_eq!(merged, ContingencyMatrix::new(2, 2));
    }
}
