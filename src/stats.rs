//! Query-cost counters and bucket-occupancy snapshots.
//!
//! [`StatsTracker`] is attached to a single probe call: it starts at zero,
//! counts the work that call performed, and is returned alongside the result.
//! Trackers from separate calls can be summed with `+=` when a caller wants
//! aggregate cost over a query batch.
//!
//! [`IndexStats`] is the read-only occupancy snapshot behind
//! `Index::stats()`; it is diagnostic data for callers to log, never control
//! flow.

use serde::{Deserialize, Serialize};

/// Work counters for one probe call.
///
/// A bucket visit is one slot scanned in one partition; a partition visit is
/// one (table, partition) pair entered; comparisons count candidate scorings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTracker {
    pub comparisons: u64,
    pub buckets_visited: u64,
    pub partitions_visited: u64,
    pub tables_visited: u64,
}

impl StatsTracker {
    #[inline]
    pub(crate) fn incr_comparisons(&mut self) {
        self.comparisons += 1;
    }

    #[inline]
    pub(crate) fn incr_buckets_visited(&mut self) {
        self.buckets_visited += 1;
    }

    #[inline]
    pub(crate) fn incr_partitions_visited(&mut self) {
        self.partitions_visited += 1;
    }

    #[inline]
    pub(crate) fn incr_tables_visited(&mut self) {
        self.tables_visited += 1;
    }
}

impl std::ops::AddAssign for StatsTracker {
    fn add_assign(&mut self, rhs: Self) {
        self.comparisons += rhs.comparisons;
        self.buckets_visited += rhs.buckets_visited;
        self.partitions_visited += rhs.partitions_visited;
        self.tables_visited += rhs.tables_visited;
    }
}

/// Occupancy summary for one partition's bucket array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStats {
    /// Items stored in this partition.
    pub items: usize,
    /// Buckets holding at least one item.
    pub non_empty_buckets: usize,
    /// Largest bucket.
    pub max_bucket_len: usize,
    /// Mean size over non-empty buckets (0.0 when all are empty).
    pub mean_bucket_len: f64,
    /// Standard deviation over non-empty buckets.
    pub stdev_bucket_len: f64,
}

/// Occupancy summaries for every partition of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStats {
    pub partitions: Vec<PartitionStats>,
}

/// Snapshot of the whole index's bucket occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub num_tables: usize,
    pub num_partitions: usize,
    pub num_buckets: usize,
    pub total_items: usize,
    pub tables: Vec<TableStats>,
}

/// Mean and population standard deviation of a sample of bucket sizes.
pub(crate) fn mean_stdev(sizes: &[usize]) -> (f64, f64) {
    if sizes.is_empty() {
        return (0.0, 0.0);
    }
    let n = sizes.len() as f64;
    let mean = sizes.iter().map(|s| *s as f64).sum::<f64>() / n;
    let var = sizes
        .iter()
        .map(|s| {
            let d = *s as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}
