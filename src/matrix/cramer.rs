//! Cramer's V derived from a contingency matrix

use super::ContingencyMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why Cramer's V could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// No observations at all
    EmptyTable,
    /// One of the attributes has a single observed category
    DegenerateDimension,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "no observations"),
            Self::DegenerateDimension => write!(f, "single observed category"),
        }
    }
}

/// Outcome of a Cramer's V computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CramerIndex {
    /// Association strength in `[0, 1]`
    Defined { value: f64 },
    /// The statistic has no meaning for this table
    Undefined { reason: UndefinedReason },
}

impl CramerIndex {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined { value } => Some(*value),
            Self::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }
}

impl ContingencyMatrix {
    /// Pearson chi-squared statistic against the independence model
    ///
    /// Cells whose expected count is zero lie in an unobserved row or
    /// column and contribute nothing.
    pub fn chi_squared(&self) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        let row_totals = self.row_totals();
        let col_totals = self.col_totals();

        let mut chi2 = 0.0;
        for (i, &row_total) in row_totals.iter().enumerate() {
            for (j, &col_total) in col_totals.iter().enumerate() {
                let expected = row_total as f64 * col_total as f64 / n;
                if expected == 0.0 {
                    continue;
                }
                let observed = self.counts()[i * self.cols() + j] as f64;
                let diff = observed - expected;
                chi2 += diff * diff / expected;
            }
        }
        chi2
    }

    /// Cramer's V: `sqrt(chi2 / (n * k))` with `k = min(r - 1, c - 1)`
    ///
    /// `r` and `c` count the rows and columns that hold at least one
    /// observation; categories declared in the schema but never seen do not
    /// make a table less degenerate. The result is clamped to `[0, 1]`.
    pub fn cramer_index(&self) -> CramerIndex {
        let n = self.total();
        if n == 0 {
            return CramerIndex::Undefined {
                reason: UndefinedReason::EmptyTable,
            };
        }

        let observed_rows = self.row_totals().iter().filter(|&&t| t > 0).count();
        let observed_cols = self.col_totals().iter().filter(|&&t| t > 0).count();
        let k = observed_rows.min(observed_cols).saturating_sub(1);
        if k == 0 {
            return CramerIndex::Undefined {
                reason: UndefinedReason::DegenerateDimension,
            };
        }

        let v = (self.chi_squared() / (n as f64 * k as f64)).sqrt();
        let value = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        CramerIndex::Defined { value }
    }
}
