//! Similarity objectives the index can rank by.
//!
//! Probe results are ordered by a score where **higher is better** for both
//! objectives, so Euclidean mode negates the distance. Thresholds passed to
//! `probe_approx`/`k_probe_approx` live on the same scale: an inner-product
//! threshold is a raw dot product, a Euclidean threshold is a negated
//! distance (e.g. `c = -0.5` accepts candidates within distance `0.5`).

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;
use crate::vector;

/// Scoring objective, fixed per index at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Similarity {
    /// Maximum inner product search. Items are bucketed through the
    /// asymmetric norm-padding transform; candidates score as `dot(q, x)`.
    InnerProduct,
    /// Nearest neighbor by Euclidean distance, scored as `-l2(q, x)`.
    /// Buckets are still selected by sign-random-projection hashing, which
    /// treats the raw vectors angularly.
    Euclidean,
}

impl Similarity {
    /// Score a candidate against a query; higher is better.
    #[inline]
    #[must_use]
    pub fn score<S: Scalar>(self, query: &[S], item: &[S]) -> S {
        match self {
            Similarity::InnerProduct => vector::dot(query, item),
            Similarity::Euclidean => -vector::l2_distance(query, item),
        }
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Similarity::InnerProduct
    }
}
