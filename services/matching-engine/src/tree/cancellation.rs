//! Cancellation index
//!
//! Per (price, side), cancelled amounts are stored (scaled down to 64 bits)
//! at the cancelling order's queue index: the inner tree for a bucket of
//! 32 768 consecutive indices, the outer tree aggregating bucket totals.
//! `cumulative_before(k)` — the total cancelled at indices strictly below
//! `k` — is one outer range query plus one inner range query, which is what
//! keeps claim decisions logarithmic however deep the queue has grown.

use std::collections::{BTreeMap, HashMap};
use types::errors::TreeError;
use types::numeric::Price;
use types::order::Side;

use super::{SegmentTree, SEGMENT_CAPACITY};

/// Queue indices covered by one inner tree
pub const BUCKET_CAPACITY: u64 = SEGMENT_CAPACITY as u64;

#[derive(Debug, Clone, Default)]
struct CancellationQueue {
    /// bucket -> inner tree of per-index cancelled amounts
    inner: BTreeMap<u32, SegmentTree>,
    /// outer tree: leaf per bucket, holding that bucket's total
    outer: SegmentTree,
}

/// Two-level cancellation index keyed by (price, side).
#[derive(Debug, Clone, Default)]
pub struct CancellationIndex {
    queues: HashMap<(Price, Side), CancellationQueue>,
}

impl CancellationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the order at `index` cancelled `raw` scaled units.
    ///
    /// Overwrite semantics; an order cancels at most once, so each leaf is
    /// written at most once in practice. Both tree levels are checked before
    /// either is mutated, so a failure leaves the index unchanged.
    pub fn record(
        &mut self,
        price: Price,
        side: Side,
        index: u64,
        raw: u64,
    ) -> Result<(), TreeError> {
        let bucket = index / BUCKET_CAPACITY;
        let pos = (index % BUCKET_CAPACITY) as usize;
        if bucket >= SEGMENT_CAPACITY as u64 {
            return Err(TreeError::OutOfRange { index });
        }
        let bucket = bucket as usize;

        let queue = self.queues.entry((price, side)).or_default();
        let tree = queue.inner.entry(bucket as u32).or_default();

        let bucket_total = (tree.total() - tree.get(pos))
            .checked_add(raw)
            .ok_or(TreeError::Overflow)?;
        (queue.outer.total() - queue.outer.get(bucket))
            .checked_add(bucket_total)
            .ok_or(TreeError::Overflow)?;

        tree.update(pos, raw)?;
        queue.outer.update(bucket, bucket_total)?;
        Ok(())
    }

    /// Total cancelled (in scaled units) at queue indices strictly below
    /// `index`.
    pub fn cumulative_before(&self, price: Price, side: Side, index: u64) -> u64 {
        let Some(queue) = self.queues.get(&(price, side)) else {
            return 0;
        };
        let bucket = index / BUCKET_CAPACITY;
        if bucket >= SEGMENT_CAPACITY as u64 {
            // Beyond the addressable range every recorded index is earlier.
            return queue.outer.total();
        }
        let bucket = bucket as usize;
        let pos = (index % BUCKET_CAPACITY) as usize;

        let earlier_buckets = queue.outer.query(0, bucket);
        let within_bucket = queue
            .inner
            .get(&(bucket as u32))
            .map_or(0, |tree| tree.query(0, pos));
        // Disjoint leaf subsets of one queue: bounded by the outer total.
        earlier_buckets + within_bucket
    }

    /// The scaled amount recorded at exactly `index`, zero if none.
    pub fn recorded(&self, price: Price, side: Side, index: u64) -> u64 {
        let Some(queue) = self.queues.get(&(price, side)) else {
            return 0;
        };
        let bucket = index / BUCKET_CAPACITY;
        if bucket >= SEGMENT_CAPACITY as u64 {
            return 0;
        }
        queue
            .inner
            .get(&(bucket as u32))
            .map_or(0, |tree| tree.get((index % BUCKET_CAPACITY) as usize))
    }

    /// Total cancelled (in scaled units) across the whole (price, side)
    /// queue.
    pub fn total(&self, price: Price, side: Side) -> u64 {
        self.queues
            .get(&(price, side))
            .map_or(0, |queue| queue.outer.total())
    }
}
