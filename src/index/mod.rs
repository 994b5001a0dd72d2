//! The multiprobe index: tables, fill, and the probe family.
//!
//! An [`Index`] owns `num_tables` hash tables, each with an independently
//! seeded [`HashFamily`](crate::hash::HashFamily) and `num_partitions`
//! bucket arrays. `fill` loads items; the probe family answers queries.
//!
//! ## Query lifecycle
//!
//! Every query runs `START -> SCANNING -> {FOUND | EXHAUSTED}`:
//!
//! 1. validate the query (dimension; in inner-product mode, transform it
//!    for hashing),
//! 2. scan buckets in the fixed order below, scoring candidates with the
//!    index's similarity and tracking work in a fresh
//!    [`StatsTracker`](crate::stats::StatsTracker),
//! 3. stop per the operation's rule: exact operations scan the whole
//!    budget and keep the best; approximate operations return as soon as a
//!    candidate meets the caller's threshold `c`.
//!
//! ## Scan order and `adj`
//!
//! The scan order is fixed and documented because it decides tie-breaks
//! and stats counts: **tables in index order; within a table, up to `adj`
//! entries of the multiprobe sequence (the exact bucket is the first
//! entry); for each entry, the slot is scanned in every partition in
//! order; within a bucket, insertion order.** Candidates compare by strict
//! improvement, so among equal scores the first one encountered in this
//! order wins. An item lives in every table and distinct codes can reduce
//! to one slot, so the scan re-encounters items; single-result probes are
//! unaffected, and the k-variants rank at most one match per id (the
//! first encounter).
//!
//! ## Modes
//!
//! In `Similarity::InnerProduct` mode the index is asymmetric: items are
//! norm-padded at fill time and queries are unit-normalized with a zero pad
//! before hashing, while scores stay raw `dot(query, item)`. In
//! `Similarity::Euclidean` mode vectors hash as-is and score as negated
//! distance.
//!
//! ```rust
//! use multiprobe::{Index, Similarity};
//!
//! let mut index = Index::<f32>::single_table(8, 2, 16)?;
//! index.fill(
//!     vec![vec![0.9, 0.0], vec![0.0, 0.9], vec![0.6, 0.6]],
//!     false,
//! )?;
//!
//! // Exact oracle: the full scan must find item 0, dot = 0.9.
//! let (best, _) = index.find_max_inner(&[1.0, 0.0])?;
//! let best = best.unwrap();
//! assert_eq!(best.id, 0);
//!
//! // Hash-guided probe; a budget of 2^bits entries covers every bucket,
//! // so here it must agree with the oracle.
//! let (result, stats) = index.probe(&[1.0, 0.0], 256)?;
//! assert_eq!(stats.tables_visited, 1);
//! assert_eq!(result.unwrap().id, 0);
//! # Ok::<(), multiprobe::Error>(())
//! ```

mod params;

pub use params::IndexParams;

use std::collections::{BinaryHeap, HashSet};

use log::debug;

use crate::error::{Error, Result};
use crate::hash::{HashFamily, MipsTransform};
use crate::probe::MultiProbeSequence;
use crate::scalar::Scalar;
use crate::similarity::Similarity;
use crate::stats::{IndexStats, StatsTracker};
use crate::table::{Item, Table};

/// A probe result: the stored vector, its caller-assigned id, and the
/// achieved similarity score (higher is better).
#[derive(Debug, Clone, PartialEq)]
pub struct Match<S> {
    pub vector: Vec<S>,
    pub id: u64,
    pub score: S,
}

/// Candidate retained by `k_probe`; `order` is the encounter rank used to
/// keep ties stable.
struct Ranked<'a, S> {
    score: S,
    order: u64,
    item: &'a Item<S>,
}

impl<S: Scalar> PartialEq for Ranked<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score) == std::cmp::Ordering::Equal
            && self.order == other.order
    }
}

impl<S: Scalar> Eq for Ranked<'_, S> {}

impl<S: Scalar> PartialOrd for Ranked<'_, S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Scalar> Ord for Ranked<'_, S> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // The heap's max is the weakest kept candidate: lowest score, and
        // among equal scores the latest-encountered one.
        self.score
            .total_cmp(&other.score)
            .reverse()
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Multi-table multiprobe LSH index.
///
/// Probes take `&self` and never mutate table state, so a shared index can
/// serve queries from many threads; `fill` takes `&mut self` and is the
/// single-writer operation.
#[derive(Debug, Clone)]
pub struct Index<S: Scalar> {
    dim: usize,
    params: IndexParams,
    /// Present in inner-product mode only.
    transform: Option<MipsTransform<S>>,
    tables: Vec<Table<S>>,
    len: usize,
}

impl<S: Scalar> Index<S> {
    /// Build an index over `dim`-dimensional vectors.
    ///
    /// Hash families are sampled here and never regenerate; identical
    /// `(dim, params)` always reproduce the same index shape.
    pub fn new(dim: usize, params: IndexParams) -> Result<Self> {
        params.validate()?;
        if dim == 0 {
            return Err(Error::InvalidParameter("dim must be positive".into()));
        }
        let transform = match params.similarity {
            Similarity::InnerProduct => Some(MipsTransform::new(dim, params.maxnorm)?),
            Similarity::Euclidean => None,
        };
        let family_dim = transform
            .as_ref()
            .map_or(dim, MipsTransform::augmented_dim);
        let tables = (0..params.num_tables)
            .map(|t| {
                let family =
                    HashFamily::new(params.bits, family_dim, table_seed(params.seed, t))?;
                Ok(Table::new(family, params.num_partitions, params.num_buckets))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Index {
            dim,
            params,
            transform,
            tables,
            len: 0,
        })
    }

    /// Convenience constructor mirroring the full parameter list.
    pub fn with_dims(
        num_tables: usize,
        num_partitions: usize,
        bits: usize,
        dim: usize,
        num_buckets: usize,
    ) -> Result<Self> {
        Index::new(
            dim,
            IndexParams {
                num_tables,
                num_partitions,
                bits,
                num_buckets,
                ..IndexParams::default()
            },
        )
    }

    /// Single-table, single-partition convenience constructor.
    pub fn single_table(bits: usize, dim: usize, num_buckets: usize) -> Result<Self> {
        Index::with_dims(1, 1, bits, dim, num_buckets)
    }

    /// Number of inserted items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Input dimension this index expects.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &IndexParams {
        &self.params
    }

    /// Bulk-load vectors with implicit sequential ids.
    ///
    /// Implicit ids continue from the current item count, so append fills
    /// keep ids unique; `rebuild` restarts them at zero. Mixing with
    /// explicit-id fills can produce duplicate ids, which the index
    /// stores verbatim.
    pub fn fill<I>(&mut self, vectors: I, rebuild: bool) -> Result<()>
    where
        I: IntoIterator<Item = Vec<S>>,
    {
        let base = if rebuild { 0 } else { self.len as u64 };
        let items: Vec<(Vec<S>, u64)> = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, base + i as u64))
            .collect();
        self.fill_items(items, rebuild)
    }

    /// Bulk-load `(vector, id)` pairs.
    ///
    /// The whole batch is validated up front; on error nothing is
    /// inserted. With `rebuild` all existing contents are discarded first,
    /// which makes refilling with the same data idempotent.
    pub fn fill_with_ids<I>(&mut self, items: I, rebuild: bool) -> Result<()>
    where
        I: IntoIterator<Item = (Vec<S>, u64)>,
    {
        let items: Vec<(Vec<S>, u64)> = items.into_iter().collect();
        self.fill_items(items, rebuild)
    }

    fn fill_items(&mut self, items: Vec<(Vec<S>, u64)>, rebuild: bool) -> Result<()> {
        // Validate and transform before touching any table.
        let mut prepared = Vec::with_capacity(items.len());
        for (vector, id) in items {
            if vector.len() != self.dim {
                return Err(Error::DimensionMismatch {
                    expected: self.dim,
                    got: vector.len(),
                });
            }
            let hash_input = match &self.transform {
                Some(t) => t.transform_item(&vector)?,
                None => vector.clone(),
            };
            prepared.push((vector, id, hash_input));
        }

        if rebuild {
            for table in &mut self.tables {
                table.clear();
            }
            self.len = 0;
            debug!("rebuild: cleared {} tables", self.tables.len());
        }

        let num_partitions = self.params.num_partitions;
        let inserted = prepared.len();
        for (vector, id, hash_input) in prepared {
            let partition = self.len % num_partitions;
            // One hash evaluation per table, not per partition.
            for table in &mut self.tables {
                let code = table.family.hash(&hash_input)?;
                table.insert(
                    partition,
                    &code,
                    Item {
                        vector: vector.clone(),
                        id,
                    },
                );
            }
            self.len += 1;
        }
        debug!(
            "filled {} items across {} tables ({} total)",
            inserted,
            self.tables.len(),
            self.len
        );
        Ok(())
    }

    fn check_query_dim(&self, query: &[S]) -> Result<()> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }
        Ok(())
    }

    /// The vector actually hashed for a query (mode-dependent).
    fn hash_input(&self, query: &[S]) -> Result<Vec<S>> {
        match &self.transform {
            Some(t) => t.transform_query(query),
            None => Ok(query.to_vec()),
        }
    }

    /// Walk buckets in the documented scan order, feeding each candidate to
    /// `visit`. `visit` returns `false` to stop the whole scan.
    fn scan<'s, F>(
        &'s self,
        hash_input: &[S],
        adj: usize,
        tracker: &mut StatsTracker,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(&'s Item<S>) -> bool,
    {
        for table in &self.tables {
            tracker.incr_tables_visited();
            let (code, projections) = table.family.hash_scored(hash_input)?;
            let sequence = MultiProbeSequence::new(code, &projections);
            for (entry, probe_code) in sequence.take(adj).enumerate() {
                let slot = probe_code.slot(table.num_buckets);
                for partition in 0..table.partitions.len() {
                    if entry == 0 {
                        tracker.incr_partitions_visited();
                    }
                    tracker.incr_buckets_visited();
                    for item in table.bucket(partition, slot) {
                        tracker.incr_comparisons();
                        if !visit(item) {
                            return Ok(());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Best candidate by true similarity over up to `adj` sequence entries
    /// per table, or `None` when every scanned bucket was empty.
    pub fn probe(&self, query: &[S], adj: usize) -> Result<(Option<Match<S>>, StatsTracker)> {
        self.check_query_dim(query)?;
        let mut tracker = StatsTracker::default();
        if self.len == 0 {
            return Ok((None, tracker));
        }
        let hash_input = self.hash_input(query)?;
        let similarity = self.params.similarity;
        let mut best: Option<Match<S>> = None;
        self.scan(&hash_input, adj, &mut tracker, |item| {
            let score = similarity.score(query, &item.vector);
            let improves = match &best {
                None => true,
                Some(b) => score.total_cmp(&b.score) == std::cmp::Ordering::Greater,
            };
            if improves {
                best = Some(Match {
                    vector: item.vector.clone(),
                    id: item.id,
                    score,
                });
            }
            true
        })?;
        Ok((best, tracker))
    }

    /// Top-`k` candidates by true similarity, best first.
    ///
    /// At most one match per id is ranked (the scan re-encounters items
    /// through multiple tables; the first encounter counts). Returns
    /// `None` only when zero candidates were scanned; otherwise the result
    /// holds up to `k` matches.
    pub fn k_probe(
        &self,
        k: usize,
        query: &[S],
        adj: usize,
    ) -> Result<(Option<Vec<Match<S>>>, StatsTracker)> {
        if k == 0 {
            return Err(Error::InvalidParameter("k must be positive".into()));
        }
        self.check_query_dim(query)?;
        let mut tracker = StatsTracker::default();
        if self.len == 0 {
            return Ok((None, tracker));
        }
        let hash_input = self.hash_input(query)?;
        let similarity = self.params.similarity;
        let mut heap: BinaryHeap<Ranked<'_, S>> = BinaryHeap::with_capacity(k + 1);
        let mut in_heap: HashSet<u64> = HashSet::with_capacity(k + 1);
        let mut order = 0u64;
        self.scan(&hash_input, adj, &mut tracker, |item| {
            if in_heap.contains(&item.id) {
                return true;
            }
            let score = similarity.score(query, &item.vector);
            let node = Ranked { score, order, item };
            order += 1;
            if heap.len() < k {
                in_heap.insert(item.id);
                heap.push(node);
            } else if let Some(worst) = heap.peek() {
                // Strictly better only: an equal score never evicts an
                // earlier candidate.
                if node.score.total_cmp(&worst.score) == std::cmp::Ordering::Greater {
                    if let Some(evicted) = heap.pop() {
                        in_heap.remove(&evicted.item.id);
                    }
                    in_heap.insert(item.id);
                    heap.push(node);
                }
            }
            true
        })?;
        if heap.is_empty() {
            return Ok((None, tracker));
        }
        let mut ranked = heap.into_vec();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.order.cmp(&b.order))
        });
        let matches = ranked
            .into_iter()
            .map(|r| Match {
                vector: r.item.vector.clone(),
                id: r.item.id,
                score: r.score,
            })
            .collect();
        Ok((Some(matches), tracker))
    }

    /// First candidate whose similarity reaches the threshold `c`.
    ///
    /// Stops mid-bucket on success; `None` when the budget is exhausted
    /// with nothing at or above `c`. This is the principal approximate
    /// mode: it trades recall for latency.
    pub fn probe_approx(
        &self,
        query: &[S],
        c: S,
        adj: usize,
    ) -> Result<(Option<Match<S>>, StatsTracker)> {
        self.check_query_dim(query)?;
        let mut tracker = StatsTracker::default();
        if self.len == 0 {
            return Ok((None, tracker));
        }
        let hash_input = self.hash_input(query)?;
        let similarity = self.params.similarity;
        let mut found: Option<Match<S>> = None;
        self.scan(&hash_input, adj, &mut tracker, |item| {
            let score = similarity.score(query, &item.vector);
            if score.total_cmp(&c) != std::cmp::Ordering::Less {
                found = Some(Match {
                    vector: item.vector.clone(),
                    id: item.id,
                    score,
                });
                return false;
            }
            true
        })?;
        Ok((found, tracker))
    }

    /// Collect candidates meeting threshold `c` until `k` are found or the
    /// budget is exhausted; collected matches are returned best first, at
    /// most one per id.
    pub fn k_probe_approx(
        &self,
        k: usize,
        query: &[S],
        c: S,
        adj: usize,
    ) -> Result<(Option<Vec<Match<S>>>, StatsTracker)> {
        if k == 0 {
            return Err(Error::InvalidParameter("k must be positive".into()));
        }
        self.check_query_dim(query)?;
        let mut tracker = StatsTracker::default();
        if self.len == 0 {
            return Ok((None, tracker));
        }
        let hash_input = self.hash_input(query)?;
        let similarity = self.params.similarity;
        let mut collected: Vec<Match<S>> = Vec::with_capacity(k);
        let mut seen: HashSet<u64> = HashSet::with_capacity(k);
        self.scan(&hash_input, adj, &mut tracker, |item| {
            if seen.contains(&item.id) {
                return true;
            }
            let score = similarity.score(query, &item.vector);
            if score.total_cmp(&c) != std::cmp::Ordering::Less {
                seen.insert(item.id);
                collected.push(Match {
                    vector: item.vector.clone(),
                    id: item.id,
                    score,
                });
                if collected.len() == k {
                    return false;
                }
            }
            true
        })?;
        if collected.is_empty() {
            return Ok((None, tracker));
        }
        collected.sort_by(|a, b| a.score.total_cmp(&b.score).reverse());
        Ok((Some(collected), tracker))
    }

    /// Exact full scan over all inserted items; the ground-truth oracle.
    ///
    /// Scores are computed directly against the stored vectors (hashing and
    /// the query transform play no role), so results are on the same scale
    /// as the probe family's. Ties resolve to the first item in partition-
    /// major, slot-ascending, insertion order.
    pub fn find_max_inner(&self, query: &[S]) -> Result<(Option<Match<S>>, StatsTracker)> {
        self.check_query_dim(query)?;
        let mut tracker = StatsTracker::default();
        if self.len == 0 {
            return Ok((None, tracker));
        }
        let similarity = self.params.similarity;
        let mut best: Option<Match<S>> = None;
        // Every item lives in every table; one table is the whole dataset.
        if let Some(table) = self.tables.first() {
            tracker.incr_tables_visited();
            for partition in &table.partitions {
                tracker.incr_partitions_visited();
                for bucket in &partition.buckets {
                    tracker.incr_buckets_visited();
                    for item in bucket {
                        tracker.incr_comparisons();
                        let score = similarity.score(query, &item.vector);
                        let improves = match &best {
                            None => true,
                            Some(b) => score.total_cmp(&b.score) == std::cmp::Ordering::Greater,
                        };
                        if improves {
                            best = Some(Match {
                                vector: item.vector.clone(),
                                id: item.id,
                                score,
                            });
                        }
                    }
                }
            }
        }
        Ok((best, tracker))
    }

    /// Read-only occupancy snapshot for diagnostics; never control flow.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_tables: self.params.num_tables,
            num_partitions: self.params.num_partitions,
            num_buckets: self.params.num_buckets,
            total_items: self.len,
            tables: self.tables.iter().map(Table::occupancy).collect(),
        }
    }
}

/// Independent per-table seed streams from one index seed.
fn table_seed(seed: u64, table: usize) -> u64 {
    seed.wrapping_add((table as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
