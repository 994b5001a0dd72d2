//! Hashing layer: sign random projections, packed codes, and the MIPS
//! reduction.
//!
//! The core idea of locality-sensitive hashing: **design hash functions
//! where similar vectors collide more often than dissimilar ones**, then
//! trade a full scan for a few bucket scans.
//!
//! ## Sign random projections
//!
//! Draw a random hyperplane `r` with standard-normal components. For two
//! vectors `a`, `b` at angle `theta`,
//!
//! ```text
//! P[sign(r . a) = sign(r . b)] = 1 - theta / pi
//! ```
//!
//! (Charikar 2002). One hyperplane gives one bit; a [`HashFamily`] stacks
//! `bits` of them into a [`HashCode`]. Collision probability of the full
//! code is then a monotonically increasing function of cosine similarity,
//! which is what makes bucket lookup meaningful.
//!
//! ## From inner products to angles
//!
//! Maximizing `dot(q, x)` is not an angular problem: a long vector can win
//! on magnitude alone. [`MipsTransform`] pads items to constant norm
//! (appending `sqrt(maxnorm^2 - |x|^2)`) and pads queries with a zero, after
//! which angular ranking over the padded vectors equals inner-product
//! ranking over the originals (Neyshabur & Srebro 2015). The transform is
//! asymmetric: items and queries are padded differently, and queries are
//! normalized to unit length first.
//!
//! ## Evaluation surface
//!
//! [`HashFamily::hash_max`] (code reduced modulo a cap) and
//! [`bit_agreement`] (Hamming similarity of two codes) are exposed so
//! callers can empirically validate the collision-probability-vs-similarity
//! curve without building an index:
//!
//! ```rust
//! use multiprobe::hash::{bit_agreement, HashFamily};
//!
//! let family = HashFamily::<f32>::new(64, 8, 42).unwrap();
//! let a = family.hash(&[1.0, 0.5, 0.0, 0.2, 0.9, -0.3, 0.1, 0.4]).unwrap();
//! let b = family.hash(&[1.0, 0.5, 0.1, 0.2, 0.9, -0.3, 0.1, 0.4]).unwrap();
//! // Nearby vectors agree on most bits.
//! assert!(bit_agreement(&a, &b, 64) > 48);
//! ```
//!
//! ## References
//!
//! - Charikar (2002). "Similarity estimation techniques from rounding
//!   algorithms." (sign LSH)
//! - Neyshabur & Srebro (2015). "On symmetric and asymmetric LSHs for inner
//!   product search." (the norm-padding reduction)
//! - Indyk & Motwani (1998). "Approximate nearest neighbors: towards
//!   removing the curse of dimensionality." (LSH theory)

mod code;
mod family;
mod mips;

pub use code::{bit_agreement, HashCode};
pub use family::HashFamily;
pub use mips::MipsTransform;
