//! multiprobe: Multiprobe LSH for maximum inner product search.
//!
//! An in-memory approximate-nearest-neighbor index built on
//! locality-sensitive hashing, organized leaf-first:
//!
//! - `hash/`: sign random projections, packed codes, the MIPS transform
//! - `probe`: the margin-ranked multiprobe perturbation sequence
//! - `index/`: tables, fill, and the probe / k-probe operations
//! - `stats`: per-query work counters and occupancy snapshots
//!
//! # Critical Nuances
//!
//! ## Why Multiprobe
//!
//! Plain LSH needs many tables to reach high recall: each table is one
//! independent chance for a near neighbor to collide with the query.
//! Multiprobe keeps a handful of tables and instead visits several
//! *nearby* buckets per table, in an order ranked by how plausible each
//! bit perturbation is for this particular query (its projection
//! margins). The adjacency budget `adj` becomes the accuracy/latency
//! knob.
//!
//! **Why it works**: a bit that barely cleared its hyperplane is the bit
//! most likely to differ for a true neighbor, so flipping low-margin
//! bits first visits the buckets where misplaced neighbors actually are.
//!
//! ## Inner Products Are Not Angles
//!
//! Maximum inner product search rewards magnitude as well as direction,
//! so angular LSH alone ranks it wrongly. The index applies an
//! asymmetric transform at fill time (pad every item up to a shared
//! norm) and at query time (unit-normalize, pad with zero), after which
//! bucketing is angular while reported scores stay raw `dot(query,
//! item)`. Items must fit the configured `maxnorm`.
//!
//! ## When Exact Search Beats Approximate
//!
//! - Small datasets (< 10K vectors): the `find_max_inner` full scan is
//!   faster than tuning an index
//! - Very high recall requirements: probe budgets approaching `2^bits`
//!   degenerate into a slower full scan
//!
//! # Quickstart
//!
//! ```rust
//! use multiprobe::{Index, IndexParams};
//!
//! let params = IndexParams {
//!     num_tables: 2,
//!     bits: 8,
//!     num_buckets: 16,
//!     ..IndexParams::default()
//! };
//! let mut index = Index::<f32>::new(3, params)?;
//! index.fill_with_ids(
//!     vec![
//!         (vec![0.8, 0.1, 0.0], 10),
//!         (vec![0.0, 0.9, 0.1], 11),
//!         (vec![0.1, 0.0, 0.7], 12),
//!     ],
//!     false,
//! )?;
//!
//! // A budget of 2^bits sequence entries visits every bucket, so the
//! // probe must agree with the exact oracle here.
//! let query = [0.0, 1.0, 0.0];
//! let (hit, stats) = index.probe(&query, 256)?;
//! assert_eq!(hit.unwrap().id, 11);
//! assert!(stats.comparisons > 0);
//!
//! let (oracle, _) = index.find_max_inner(&query)?;
//! assert_eq!(oracle.unwrap().id, 11);
//! # Ok::<(), multiprobe::Error>(())
//! ```

pub mod error;
pub mod hash;
pub mod index;
pub mod probe;
pub mod scalar;
pub mod similarity;
pub mod stats;
pub mod vector;

mod table;

// Re-exports
pub use error::{Error, Result};
pub use index::{Index, IndexParams, Match};
pub use scalar::Scalar;
pub use similarity::Similarity;
pub use stats::{IndexStats, PartitionStats, StatsTracker, TableStats};
