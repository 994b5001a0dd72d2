//! Sign-random-projection hash family.
//!
//! Each family holds `bits` hyperplane normals with standard-normal
//! components, drawn once from a seeded RNG at construction and never
//! regenerated. Two vectors collide on a given bit with probability
//! `1 - theta / pi` (Charikar 2002), so full-code collision probability is a
//! monotonically increasing function of cosine similarity.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{Error, Result};
use crate::hash::code::HashCode;
use crate::scalar::Scalar;
use crate::vector;

/// A fixed set of `bits` random hyperplanes mapping vectors to
/// [`HashCode`]s.
///
/// Construction with the same `(bits, dim, seed)` always yields the same
/// family, so codes are reproducible across processes.
#[derive(Debug, Clone)]
pub struct HashFamily<S> {
    bits: usize,
    dim: usize,
    /// Row-major `bits x dim` hyperplane components.
    planes: Vec<S>,
}

impl<S: Scalar> HashFamily<S> {
    /// Create a family of `bits` hyperplanes over `dim`-dimensional input.
    pub fn new(bits: usize, dim: usize, seed: u64) -> Result<Self> {
        if bits == 0 {
            return Err(Error::InvalidParameter("bits must be positive".into()));
        }
        if dim == 0 {
            return Err(Error::InvalidParameter("dim must be positive".into()));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let planes = (0..bits * dim)
            .map(|_| {
                let z: f64 = StandardNormal.sample(&mut rng);
                S::from_f64(z)
            })
            .collect();
        Ok(HashFamily { bits, dim, planes })
    }

    /// Code width produced by this family.
    #[inline]
    #[must_use]
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Input dimension this family expects.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn plane(&self, i: usize) -> &[S] {
        &self.planes[i * self.dim..(i + 1) * self.dim]
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

    /// Hash a vector to its `bits`-wide code.
    ///
    /// Bit `i` is 1 when `dot(v, plane_i) >= 0`; plane 0 owns the most
    /// significant bit. Pure and deterministic for a fixed family.
    pub fn hash(&self, v: &[S]) -> Result<HashCode> {
        self.check_dim(v)?;
        let mut code = HashCode::zero(self.bits);
        for i in 0..self.bits {
            if vector::dot(self.plane(i), v) >= S::ZERO {
                code.set_bit(self.bits - 1 - i);
            }
        }
        Ok(code)
    }

    /// Hash a vector and keep the raw per-plane projections.
    ///
    /// The projections are the multiprobe ranking signal: the smaller
    /// `|projection[i]|`, the closer the vector sits to plane `i`'s decision
    /// boundary and the cheaper it is to flip that bit.
    pub fn hash_scored(&self, v: &[S]) -> Result<(HashCode, Vec<S>)> {
        self.check_dim(v)?;
        let mut code = HashCode::zero(self.bits);
        let mut projections = Vec::with_capacity(self.bits);
        for i in 0..self.bits {
            let proj = vector::dot(self.plane(i), v);
            if proj >= S::ZERO {
                code.set_bit(self.bits - 1 - i);
            }
            projections.push(proj);
        }
        Ok((code, projections))
    }

    /// Hash reduced modulo `max_code`, the form consumed by bucket-slot
    /// evaluation harnesses.
    pub fn hash_max(&self, v: &[S], max_code: u64) -> Result<u64> {
        if max_code == 0 {
            return Err(Error::InvalidParameter("max_code must be positive".into()));
        }
        Ok(self.hash(v)?.reduced(max_code))
    }
}
