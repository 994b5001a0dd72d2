//! Portable dense-vector kernels.
//!
//! These dominate probe cost: every candidate comparison is a `dot` or an
//! `l2_distance_squared` over the stored vector. Kernels are generic over
//! [`Scalar`](crate::scalar::Scalar) so the same code paths serve `f32` and
//! `f64` indexes.

use crate::scalar::Scalar;

/// Norms below this (after widening to `f64`) are treated as zero.
pub const NORM_EPSILON: f64 = 1e-9;

/// Dot product of two equal-length vectors.
#[inline]
#[must_use]
pub fn dot<S: Scalar>(a: &[S], b: &[S]) -> S {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .fold(S::ZERO, |acc, (x, y)| acc + *x * *y)
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm<S: Scalar>(v: &[S]) -> S {
    dot(v, v).sqrt()
}

/// L2 (Euclidean) distance between two vectors.
#[inline]
#[must_use]
pub fn l2_distance<S: Scalar>(a: &[S], b: &[S]) -> S {
    l2_distance_squared(a, b).sqrt()
}

/// L2 distance squared (faster when only comparing distances).
#[inline]
#[must_use]
pub fn l2_distance_squared<S: Scalar>(a: &[S], b: &[S]) -> S {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).fold(S::ZERO, |acc, (x, y)| {
        let d = *x - *y;
        acc + d * d
    })
}

/// Unit-normalized copy of `v`, or `None` when the norm is effectively zero.
#[must_use]
pub fn normalized<S: Scalar>(v: &[S]) -> Option<Vec<S>> {
    let n = norm(v);
    if n.to_f64() <= NORM_EPSILON {
        return None;
    }
    Some(v.iter().map(|x| *x / n).collect())
}
