//! Text wire format for partial matrices
//!
//! A matrix travels between the map and reduce sides as a single line:
//!
//! ```text
//! rows,cols,c00,c01,...,c0n,c10,...
//! ```
//!
//! Counts are written in row-major order. The encoding is exactly
//! reversible and contains no delimiter other than the comma.

use super::{ContingencyMatrix, MatrixError};
use std::fmt;
use std::str::FromStr;

/// Delimiter between the tokens of a serialized matrix
pub const WIRE_DELIMITER: char = ',';

impl ContingencyMatrix {
    /// Encode as `rows,cols,counts...`
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(8 + self.counts().len() * 2);
        out.push_str(&self.rows().to_string());
        out.push(WIRE_DELIMITER);
        out.push_str(&self.cols().to_string());
        for count in self.counts() {
            out.push(WIRE_DELIMITER);
            out.push_str(&count.to_string());
        }
        out
    }

    /// Decode a matrix produced by [`serialize`](Self::serialize)
    ///
    /// Truncated, padded, or non-numeric input is rejected; a partial
    /// matrix is never returned.
    pub fn deserialize(data: &str) -> Result<Self, MatrixError> {
        let data = data.trim();
        if data.is_empty() {
            return Err(malformed("empty input"));
        }

        let mut tokens = data.split(WIRE_DELIMITER);
        let rows = parse_dimension(tokens.next(), "rows")?;
        let cols = parse_dimension(tokens.next(), "cols")?;

        let cells = rows
            .checked_mul(cols)
            .ok_or_else(|| malformed(format!("dimensions {rows}x{cols} overflow")))?;

        let counts = tokens
            .enumerate()
            .map(|(idx, token)| {
                token.trim().parse::<u64>().map_err(|e| {
                    malformed(format!("count {idx} is not a non-negative integer ({token:?}): {e}"))
                })
            })
            .collect::<Result<Vec<u64>, MatrixError>>()?;

        if counts.len() != cells {
            return Err(malformed(format!(
                "expected {} counts for {}x{} matrix, found {}",
                cells,
                rows,
                cols,
                counts.len()
            )));
        }

        Ok(ContingencyMatrix::from_parts(rows, cols, counts))
    }
}

fn parse_dimension(token: Option<&str>, name: &str) -> Result<usize, MatrixError> {
    let token = token.ok_or_else(|| malformed(format!("missing {name}")))?;
    token
        .trim()
        .parse::<usize>()
        .map_err(|e| malformed(format!("invalid {name} {token:?}: {e}")))
}

fn malformed(reason: impl Into<String>) -> MatrixError {
    MatrixError::Malformed {
        reason: reason.into(),
    }
}

impl fmt::Display for ContingencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for ContingencyMatrix {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s)
    }
}
