//! Error types for divvscroll.

use std::fmt;

/// Result type alias for divvscroll operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for divvscroll operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A query referenced a record index past the end of the ledger.
    ///
    /// This is a caller bug, never clamped or swallowed.
    IndexOutOfRange { index: usize, len: usize },
    /// A measured height was non-positive or non-finite.
    ///
    /// Recoverable: the prior estimate stays in effect for the record.
    MeasurementAnomaly { index: usize, height: f64 },
    /// Incremental and binary offset resolution disagreed for the same
    /// offset, which means a ledger invariant has been violated.
    SearchDivergence {
        offset: f64,
        incremental: usize,
        binary: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "record index {index} out of range for ledger of {len}")
            }
            Self::MeasurementAnomaly { index, height } => {
                write!(f, "anomalous measured height {height} for record {index}")
            }
            Self::SearchDivergence {
                offset,
                incremental,
                binary,
            } => {
                write!(
                    f,
                    "search divergence at offset {offset}: incremental resolved {incremental}, binary resolved {binary}"
                )
            }
        }
    }
}

impl std::error::Error for Error {}
