//! Index construction parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::similarity::Similarity;

/// Tunable parameters for [`Index`](crate::index::Index) construction.
///
/// The input dimension is passed to the constructor separately; everything
/// here has a usable default, so call sites typically override a field or
/// two:
///
/// ```rust
/// use multiprobe::IndexParams;
///
/// let params = IndexParams {
///     num_tables: 4,
///     bits: 16,
///     ..IndexParams::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexParams {
    /// Independent hash tables. More tables raise recall and memory.
    pub num_tables: usize,
    /// Shards per table. Partitioning bounds bucket scans per shard and
    /// keeps the layout parallel-friendly; it does not change hash
    /// semantics.
    pub num_partitions: usize,
    /// Hash code width per table.
    pub bits: usize,
    /// Bucket slots per partition; codes are reduced modulo this.
    pub num_buckets: usize,
    /// Scoring objective; also selects whether the MIPS transform runs.
    pub similarity: Similarity,
    /// Upper bound on item norms in inner-product mode.
    pub maxnorm: f64,
    /// Seed for the per-table hash families.
    pub seed: u64,
}

impl Default for IndexParams {
    fn default() -> Self {
        IndexParams {
            num_tables: 8,
            num_partitions: 1,
            bits: 32,
            num_buckets: 4096,
            similarity: Similarity::InnerProduct,
            maxnorm: 1.0,
            seed: 42,
        }
    }
}

impl IndexParams {
    /// Derive `bits` and `num_tables` from a target dataset size and the
    /// desired collision probabilities: `p1` for true neighbors, `p2` for
    /// unrelated pairs (`0 < p2 < p1 < 1`).
    ///
    /// Standard LSH sizing: `bits = log(n) / log(1/p2)` drives unrelated
    /// collisions below `1/n` per table, and `num_tables = n^rho` with
    /// `rho = ln p1 / ln p2` keeps true neighbors likely to collide in at
    /// least one table.
    pub fn from_collision_probs(n: usize, p1: f64, p2: f64) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidParameter("n must be positive".into()));
        }
        if !(0.0..1.0).contains(&p2) || !(0.0..1.0).contains(&p1) || p2 <= 0.0 || p1 <= p2 {
            return Err(Error::InvalidParameter(format!(
                "collision probabilities must satisfy 0 < p2 < p1 < 1, got p1={p1}, p2={p2}"
            )));
        }
        let n_f = n as f64;
        let bits = (n_f.log2() / (1.0 / p2).log2()).round().max(1.0) as usize;
        let rho = p1.ln() / p2.ln();
        let num_tables = n_f.powf(rho).round().max(1.0) as usize;
        Ok(IndexParams {
            bits,
            num_tables,
            ..IndexParams::default()
        })
    }

    /// Reject zero structural parameters and unusable norm bounds.
    pub fn validate(&self) -> Result<()> {
        if self.num_tables == 0 {
            return Err(Error::InvalidParameter("num_tables must be positive".into()));
        }
        if self.num_partitions == 0 {
            return Err(Error::InvalidParameter(
                "num_partitions must be positive".into(),
            ));
        }
        if self.bits == 0 {
            return Err(Error::InvalidParameter("bits must be positive".into()));
        }
        if self.num_buckets == 0 {
            return Err(Error::InvalidParameter("num_buckets must be positive".into()));
        }
        if !self.maxnorm.is_finite() || self.maxnorm <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "maxnorm must be positive and finite, got {}",
                self.maxnorm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(IndexParams::default().validate().is_ok());
    }

    #[test]
    fn zero_fields_are_rejected() {
        for field in 0..4 {
            let mut p = IndexParams::default();
            match field {
                0 => p.num_tables = 0,
                1 => p.num_partitions = 0,
                2 => p.bits = 0,
                _ => p.num_buckets = 0,
            }
            assert!(p.validate().is_err());
        }
        let bad_norm = IndexParams {
            maxnorm: -2.0,
            ..IndexParams::default()
        };
        assert!(bad_norm.validate().is_err());
    }

    #[test]
    fn collision_prob_sizing_matches_closed_forms() {
        // n = 1024, p2 = 0.5: bits = log2(1024) = 10.
        // p1 = 0.8: rho = ln 0.8 / ln 0.5 = 0.3219..., 1024^rho = 9.31 -> 9.
        let p = IndexParams::from_collision_probs(1024, 0.8, 0.5).unwrap();
        assert_eq!(p.bits, 10);
        assert_eq!(p.num_tables, 9);
    }

    #[test]
    fn collision_prob_sizing_rejects_bad_inputs() {
        assert!(IndexParams::from_collision_probs(0, 0.8, 0.5).is_err());
        assert!(IndexParams::from_collision_probs(100, 0.5, 0.8).is_err());
        assert!(IndexParams::from_collision_probs(100, 1.2, 0.5).is_err());
        assert!(IndexParams::from_collision_probs(100, 0.8, 0.0).is_err());
    }
}
