//! Asymmetric transform reducing inner-product search to angular search.
//!
//! Maximum inner product is not directly LSH-able: `dot(q, x)` is unbounded
//! and not a similarity. The reduction (Neyshabur & Srebro 2015) pads every
//! item to a constant norm by appending `sqrt(maxnorm^2 - |x|^2)`, and pads
//! queries with a zero, so that for unit queries
//!
//! ```text
//! cos(q', x') = dot(q, x) / maxnorm
//! ```
//!
//! and ranking by angle over the padded vectors equals ranking by inner
//! product over the originals. Items and queries are transformed
//! differently, hence "asymmetric".

use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::vector;

/// Relative slack when checking item norms against the bound, so vectors
/// normalized in low precision do not get rejected for rounding.
const BOUND_SLACK: f64 = 1e-6;

/// Item/query augmentation for a fixed input dimension and norm bound.
#[derive(Debug, Clone)]
pub struct MipsTransform<S> {
    dim: usize,
    maxnorm: S,
}

impl<S: Scalar> MipsTransform<S> {
    /// `maxnorm` is the configured upper bound on item norms; it must be
    /// positive and finite.
    pub fn new(dim: usize, maxnorm: f64) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidParameter("dim must be positive".into()));
        }
        if !maxnorm.is_finite() || maxnorm <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "maxnorm must be positive and finite, got {maxnorm}"
            )));
        }
        Ok(MipsTransform {
            dim,
            maxnorm: S::from_f64(maxnorm),
        })
    }

    /// Input dimension.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Dimension after augmentation; hash families in inner-product mode are
    /// built over this.
    #[inline]
    #[must_use]
    pub fn augmented_dim(&self) -> usize {
        self.dim + 1
    }

    /// Configured norm bound.
    #[inline]
    #[must_use]
    pub fn maxnorm(&self) -> f64 {
        self.maxnorm.to_f64()
    }

    fn check_dim(&self, v: &[S]) -> Result<()> {
        if v.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: v.len(),
            });
        }
        Ok(())
    }

    /// Pad an item to constant norm `maxnorm`.
    ///
    /// Items at the bound get a zero pad; items within rounding slack of the
    /// bound are clamped rather than rejected.
    pub fn transform_item(&self, v: &[S]) -> Result<Vec<S>> {
        self.check_dim(v)?;
        let n = vector::norm(v);
        let bound = self.maxnorm.to_f64();
        if n.to_f64() > bound * (1.0 + BOUND_SLACK) {
            return Err(Error::NormExceedsBound {
                norm: n.to_f64(),
                bound,
            });
        }
        let pad_sq = self.maxnorm * self.maxnorm - n * n;
        let pad = if pad_sq <= S::ZERO { S::ZERO } else { pad_sq.sqrt() };
        let mut out = Vec::with_capacity(self.dim + 1);
        out.extend_from_slice(v);
        out.push(pad);
        Ok(out)
    }

    /// Normalize a query to unit length and pad it with a zero.
    ///
    /// The zero-norm query has no direction and cannot be normalized.
    pub fn transform_query(&self, v: &[S]) -> Result<Vec<S>> {
        self.check_dim(v)?;
        let mut out = vector::normalized(v).ok_or_else(|| {
            Error::InvalidParameter("query norm is zero, cannot normalize".into())
        })?;
        out.push(S::ZERO);
        Ok(out)
    }
}
