//! Bucket storage: one hash family applied uniformly across partitions.
//!
//! A table owns `num_partitions` disjoint shards of the item population,
//! each with its own `num_buckets` bucket array. The slot for an item is
//! `hash_code mod num_buckets` in every partition, so distinct codes can
//! share a slot; those secondary collisions are resolved by the linear scan
//! at probe time. Buckets keep insertion order, and the probe tie-break
//! leans on it.

use crate::hash::{HashCode, HashFamily};
use crate::scalar::Scalar;
use crate::stats::{self, PartitionStats, TableStats};

/// A stored `(vector, id)` pair. Ids are caller-assigned and never
/// interpreted; duplicates are allowed and preserved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Item<S> {
    pub(crate) vector: Vec<S>,
    pub(crate) id: u64,
}

/// One shard of a table's item population.
#[derive(Debug, Clone)]
pub(crate) struct Partition<S> {
    pub(crate) buckets: Vec<Vec<Item<S>>>,
}

impl<S: Scalar> Partition<S> {
    fn new(num_buckets: usize) -> Self {
        Partition {
            buckets: vec![Vec::new(); num_buckets],
        }
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    fn occupancy(&self) -> PartitionStats {
        let sizes: Vec<usize> = self
            .buckets
            .iter()
            .map(Vec::len)
            .filter(|len| *len > 0)
            .collect();
        let (mean, stdev) = stats::mean_stdev(&sizes);
        PartitionStats {
            items: sizes.iter().sum(),
            non_empty_buckets: sizes.len(),
            max_bucket_len: sizes.iter().copied().max().unwrap_or(0),
            mean_bucket_len: mean,
            stdev_bucket_len: stdev,
        }
    }
}

/// One full hash table: a family plus partitioned bucket arrays.
#[derive(Debug, Clone)]
pub(crate) struct Table<S> {
    pub(crate) family: HashFamily<S>,
    pub(crate) num_buckets: usize,
    pub(crate) partitions: Vec<Partition<S>>,
}

impl<S: Scalar> Table<S> {
    pub(crate) fn new(family: HashFamily<S>, num_partitions: usize, num_buckets: usize) -> Self {
        Table {
            family,
            num_buckets,
            partitions: (0..num_partitions)
                .map(|_| Partition::new(num_buckets))
                .collect(),
        }
    }

    /// Place an item into its partition's slot for `code`.
    pub(crate) fn insert(&mut self, partition: usize, code: &HashCode, item: Item<S>) {
        let slot = code.slot(self.num_buckets);
        self.partitions[partition].buckets[slot].push(item);
    }

    /// Candidates sharing `slot` within one partition.
    #[inline]
    pub(crate) fn bucket(&self, partition: usize, slot: usize) -> &[Item<S>] {
        &self.partitions[partition].buckets[slot]
    }

    /// Discard all stored items, keeping the family and bucket shape.
    pub(crate) fn clear(&mut self) {
        for partition in &mut self.partitions {
            partition.clear();
        }
    }

    pub(crate) fn occupancy(&self) -> TableStats {
        TableStats {
            partitions: self.partitions.iter().map(Partition::occupancy).collect(),
        }
    }
}
