//! Floating-point precision abstraction.
//!
//! The index is generic over its element type so callers pick `f32` or `f64`
//! at construction time (`Index::<f32>::with_dims(...)`). The trait covers
//! exactly what the hashing and scoring paths need; it is not a general
//! numeric tower.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Element type for vectors, hyperplane projections, and similarity scores.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Additive identity.
    const ZERO: Self;

    /// Conversion from `f64`, used for configured bounds and sampled
    /// hyperplane components. Lossy for `f32`.
    fn from_f64(x: f64) -> Self;

    /// Widening conversion for diagnostics.
    fn to_f64(self) -> f64;

    fn sqrt(self) -> Self;

    fn abs(self) -> Self;

    /// IEEE total order; used wherever scores feed a heap or sort.
    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f64(x: f64) -> Self {
        x as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f32::total_cmp(self, other)
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_round_trip_for_f64() {
        let x = 0.123456789f64;
        assert_eq!(f64::from_f64(x), x);
        assert_eq!(x.to_f64(), x);
    }

    #[test]
    fn total_cmp_orders_negative_zero_below_positive() {
        assert_eq!(Scalar::total_cmp(&-0.0f32, &0.0f32), Ordering::Less);
    }
}
