//! Batched compaction and buffer growth.
//!
//! Compaction turns the accumulator's pending zone back into free space. The
//! pending records are sorted and deduplicated, then merged with the sorted
//! zone in a single duplicate-eliminating pass, so each record is handled
//! once per batch instead of once per push.
//!
//! A compaction that runs to make room for more input also decides whether
//! the buffer grows. Growth is skipped while deduplication alone frees at
//! least [`GrowthPolicy::min_free_fraction`] of the buffer, which keeps
//! duplicate-heavy streams from reallocating and whole-buffer copies rare.

#[cfg(feature = "with_serde")]
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::accumulator::DistinctAccumulator;

/// Capacity management knobs for [`DistinctAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPolicy {
    /// Capacity of a freshly created accumulator, in bytes. Raised to one
    /// record when `item_size` is wider.
    pub initial_capacity: usize,
    /// Fraction of the buffer that must be free after a space-reserving
    /// compaction. Falling below it triggers growth.
    pub min_free_fraction: f64,
    /// Capacity at which growth switches from doubling to expanding by just
    /// enough to restore `min_free_fraction`.
    pub exact_growth_threshold: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_capacity: 32,
            min_free_fraction: 0.2,
            exact_growth_threshold: 8192,
        }
    }
}

impl GrowthPolicy {
    /// Next capacity for a buffer of `capacity` bytes. Buffers below the
    /// threshold double; larger ones expand to
    /// `capacity / (1 - min_free_fraction)`.
    fn grown(&self, capacity: usize) -> usize {
        if capacity < self.exact_growth_threshold {
            capacity * 2
        } else {
            (capacity as f64 / (1.0 - self.min_free_fraction)) as usize
        }
    }
}

impl DistinctAccumulator {
    /// Sorts and deduplicates the pending zone and merges it into the sorted
    /// zone, leaving `sorted == len`.
    ///
    /// With `need_space` set, additionally ensures the compacted buffer has
    /// room for at least one more record and a policy-defined share of free
    /// space, growing it if necessary. Callers must not compact an empty
    /// accumulator.
    pub(crate) fn compact(&mut self, need_space: bool) {
        debug_assert!(self.len > 0, "compacting an empty accumulator");
        if self.len == 0 {
            return;
        }

        if self.sorted < self.len {
            let mut records = self.merged_pending(self.data.len());
            let distinct = records.len() / self.item_size;
            records.resize(self.data.len(), 0);
            self.data = records;
            self.sorted = distinct;
            self.len = distinct;
        }

        if !need_space {
            return;
        }
        let used = self.len * self.item_size;
        let free = self.data.len() - used;
        let free_fraction = free as f64 / self.data.len() as f64;
        if free_fraction < self.policy.min_free_fraction || free < self.item_size {
            // Growth must leave room for at least one more record.
            let grown = self.policy.grown(self.data.len()).max(used + self.item_size);
            self.data.resize(grown, 0);
        }
    }

    /// Distinct records of the sorted and pending zones combined, in
    /// ascending order, as one contiguous allocation of at most `capacity`
    /// bytes. The pending zone must be non-empty.
    fn merged_pending(&self, capacity: usize) -> Vec<u8> {
        debug_assert!(self.sorted < self.len);
        let item_size = self.item_size;
        let live = self.len * item_size;
        let (sorted_zone, pending_zone) = self.data[..live].split_at(self.sorted * item_size);

        // Sorting views instead of the bytes themselves keeps the sort
        // allocation-light for wide records.
        let mut pending: Vec<&[u8]> = pending_zone.chunks_exact(item_size).collect();
        pending.sort_unstable();
        pending.dedup();

        let mut out = Vec::with_capacity(capacity);
        if sorted_zone.is_empty() {
            for record in pending {
                out.extend_from_slice(record);
            }
        } else {
            merge_distinct(
                sorted_zone.chunks_exact(item_size),
                pending.into_iter(),
                &mut out,
            );
        }
        debug_assert!(is_strictly_ascending(&out, item_size));
        out
    }

    /// Records a full compaction would produce, without mutating the
    /// accumulator. Borrows the sorted zone directly when nothing is pending.
    #[cfg(feature = "with_serde")]
    pub(crate) fn compacted_records(&self) -> Cow<'_, [u8]> {
        if self.sorted == self.len {
            Cow::Borrowed(self.sorted_bytes())
        } else {
            Cow::Owned(self.merged_pending(self.len * self.item_size))
        }
    }
}

/// Merges two strictly ascending record sequences into `out`, emitting
/// records present in both sides once.
pub(crate) fn merge_distinct<'a>(
    left: impl Iterator<Item = &'a [u8]>,
    right: impl Iterator<Item = &'a [u8]>,
    out: &mut Vec<u8>,
) {
    let mut left = left.peekable();
    let mut right = right.peekable();
    loop {
        match (left.peek(), right.peek()) {
            (Some(&l), Some(&r)) => match l.cmp(r) {
                Ordering::Less => {
                    out.extend_from_slice(l);
                    left.next();
                }
                Ordering::Greater => {
                    out.extend_from_slice(r);
                    right.next();
                }
                Ordering::Equal => {
                    out.extend_from_slice(l);
                    left.next();
                    right.next();
                }
            },
            (Some(&l), None) => {
                out.extend_from_slice(l);
                left.next();
            }
            (None, Some(&r)) => {
                out.extend_from_slice(r);
                right.next();
            }
            (None, None) => break,
        }
    }
}

/// Whether `records` holds strictly ascending records of `item_size` bytes.
pub(crate) fn is_strictly_ascending(records: &[u8], item_size: usize) -> bool {
    records.len() % item_size == 0
        && records
            .chunks_exact(item_size)
            .zip(records.chunks_exact(item_size).skip(1))
            .all(|(previous, next)| previous < next)
}
