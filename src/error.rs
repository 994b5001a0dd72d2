//! Error types for index construction, fill, and probing.
//!
//! An empty index is not an error: probe operations on an index with no
//! inserted items return `None` with zeroed stats. Scan exhaustion is
//! ordinary control flow, never an `Err`.

use thiserror::Error;

/// Errors surfaced by index construction, fill, and probe operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A structural parameter was zero, non-finite, or otherwise unusable
    /// (bits, dim, num_buckets, num_tables, num_partitions, k, max_code,
    /// maxnorm, or a zero-norm query in inner-product mode).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A vector's length differs from the dimension the index was built for.
    /// Fatal for the call; index state is left untouched.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// An item's Euclidean norm exceeds the configured inner-product bound.
    /// Rescale the dataset or raise `maxnorm`.
    #[error("norm {norm} exceeds configured bound {bound}")]
    NormExceedsBound { norm: f64, bound: f64 },
}

/// Convenience result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;
