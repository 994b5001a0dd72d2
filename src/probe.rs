//! Multiprobe perturbation sequence.
//!
//! A single hash lookup misses near neighbors that landed one or two bits
//! away from the query's code. Instead of adding tables, multiprobe LSH
//! visits *perturbed* codes of the one table, ordered so the most likely
//! buckets come first (Lv et al. 2007).
//!
//! ## Ranking law
//!
//! Flipping bit `i` of the query's code is plausible exactly when the
//! query's projection onto hyperplane `i` was small: the vector sits close
//! to that decision boundary, and a true neighbor could easily fall on the
//! other side. [`MultiProbeSequence`] therefore yields:
//!
//! 1. the exact code first,
//! 2. then flip sets ordered by (set size ascending, summed |projection|
//!    ascending): every single-bit flip precedes every double-bit flip,
//!    and within a size class the bits nearest their boundary flip first.
//!
//! The sequence is the accuracy/latency knob: pulling more entries visits
//! more buckets and raises recall monotonically.
//!
//! ## Generation
//!
//! Perturbations are produced lazily from a min-heap keyed by
//! (size, summed margin), using the shift/expand successor rule over bit
//! positions pre-sorted by margin. Each of the `2^bits - 1` distinct flip
//! sets is produced at most once; successors never rank ahead of their
//! parent, so heap order equals the ranking law. Stopping early costs
//! nothing, callers just stop pulling.
//!
//! ```rust
//! use multiprobe::hash::HashFamily;
//! use multiprobe::probe::MultiProbeSequence;
//!
//! let family = HashFamily::<f32>::new(8, 4, 7).unwrap();
//! let (code, projections) = family.hash_scored(&[0.3, -0.8, 0.5, 0.1]).unwrap();
//! let mut sequence = MultiProbeSequence::new(code.clone(), &projections);
//! assert_eq!(sequence.next(), Some(code));       // exact bucket first
//! let near = sequence.next().unwrap();           // then the cheapest flip
//! assert_ne!(near, sequence.next().unwrap());
//! ```

use std::collections::BinaryHeap;

use smallvec::{smallvec, SmallVec};

use crate::hash::HashCode;
use crate::scalar::Scalar;

/// A pending flip set over margin-sorted bit positions.
#[derive(Clone)]
struct Perturbation<S> {
    /// Summed margins of the flipped bits.
    cost: S,
    /// Sorted positions into the margin-ascending order. Never empty; the
    /// last element drives the shift/expand successor rule.
    set: SmallVec<[u32; 8]>,
}

impl<S: Scalar> PartialEq for Perturbation<S> {
    fn eq(&self, other: &Self) -> bool {
        self.set.len() == other.set.len()
            && self.cost.total_cmp(&other.cost) == std::cmp::Ordering::Equal
    }
}

impl<S: Scalar> Eq for Perturbation<S> {}

impl<S: Scalar> PartialOrd for Perturbation<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Scalar> Ord for Perturbation<S> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Smaller flip sets first, then cheaper margin sums; reversed so the
        // max-heap pops the cheapest pending perturbation.
        self.set
            .len()
            .cmp(&other.set.len())
            .then_with(|| self.cost.total_cmp(&other.cost))
            .reverse()
    }
}

/// Lazy iterator over a query's probe codes, best bucket first.
///
/// Built from the output of
/// [`HashFamily::hash_scored`](crate::hash::HashFamily::hash_scored).
/// Bound the scan with `Iterator::take`.
pub struct MultiProbeSequence<S: Scalar> {
    base: HashCode,
    /// Hyperplane indices sorted by |projection| ascending.
    order: Vec<u32>,
    /// |projection| per entry of `order`.
    margins: Vec<S>,
    pending: BinaryHeap<Perturbation<S>>,
    base_emitted: bool,
}

impl<S: Scalar> MultiProbeSequence<S> {
    /// `projections` are the raw per-hyperplane dot products for `base`;
    /// one per code bit.
    #[must_use]
    pub fn new(base: HashCode, projections: &[S]) -> Self {
        debug_assert_eq!(base.width(), projections.len());
        let mut order: Vec<u32> = (0..projections.len() as u32).collect();
        order.sort_by(|a, b| {
            projections[*a as usize]
                .abs()
                .total_cmp(&projections[*b as usize].abs())
        });
        let margins = order
            .iter()
            .map(|i| projections[*i as usize].abs())
            .collect();
        MultiProbeSequence {
            base,
            order,
            margins,
            pending: BinaryHeap::new(),
            base_emitted: false,
        }
    }

    fn apply(&self, set: &[u32]) -> HashCode {
        let mut code = self.base.clone();
        for pos in set {
            code.flip_plane(self.order[*pos as usize] as usize);
        }
        code
    }
}

impl<S: Scalar> Iterator for MultiProbeSequence<S> {
    type Item = HashCode;

    fn next(&mut self) -> Option<HashCode> {
        if !self.base_emitted {
            self.base_emitted = true;
            if let Some(&first) = self.margins.first() {
                self.pending.push(Perturbation {
                    cost: first,
                    set: smallvec![0],
                });
            }
            return Some(self.base.clone());
        }
        let popped = self.pending.pop()?;
        let code = self.apply(&popped.set);
        if let Some(&last) = popped.set.last() {
            let succ = last + 1;
            if (succ as usize) < self.margins.len() {
                let step = self.margins[succ as usize];
                // Shift: trade the costliest flipped bit for the next one.
                let mut shifted = popped.set.clone();
                if let Some(tail) = shifted.last_mut() {
                    *tail = succ;
                }
                self.pending.push(Perturbation {
                    cost: popped.cost - self.margins[last as usize] + step,
                    set: shifted,
                });
                // Expand: also flip the next bit.
                let mut expanded = popped.set;
                expanded.push(succ);
                self.pending.push(Perturbation {
                    cost: popped.cost + step,
                    set: expanded,
                });
            }
        }
        Some(code)
    }
}
