//! Exact distinct accumulator over fixed width byte records.
//!
//! [`DistinctAccumulator`] answers "how many distinct values have appeared"
//! with an exact count, without hashing. Records are buffered raw and
//! deduplicated in sorted batches, so the steady-state cost per record is a
//! bounds check and a short `memcpy`, and the memory overhead per distinct
//! record is zero bytes beyond the record itself.
//!
//! ## Data storage format
//!
//! All records live in a single flat byte buffer split into three zones:
//!
//! ```text
//! +----------------------+------------------------+--------------+
//! |     sorted zone      |      pending zone      |     free     |
//! | distinct, ascending  | unsorted, may repeat   |              |
//! +----------------------+------------------------+--------------+
//! 0             sorted * item_size       len * item_size    data.len()
//! ```
//!
//! [`DistinctAccumulator::push`] appends to the pending zone. Once the free
//! zone is exhausted, the pending zone is sorted, deduplicated and merged
//! into the sorted zone in one pass; see [`crate::compact`]. Duplicate-heavy
//! streams reach a steady state where compaction keeps reclaiming the
//! pending zone and the buffer stops growing.
//!
//! Records are ordered by their raw bytes. Callers that need a particular
//! output order from [`DistinctAccumulator::records`] should encode values
//! so that byte order matches, e.g. with big-endian encoding for unsigned
//! integers.

use std::fmt::{Debug, Formatter};
use std::mem::size_of;

use crate::compact::GrowthPolicy;

/// Exact distinct accumulator over records of a fixed byte width.
#[derive(Clone)]
pub struct DistinctAccumulator {
    /// Width of every record in bytes. Fixed for the accumulator's lifetime.
    pub(crate) item_size: usize,
    /// Number of records in the sorted zone.
    pub(crate) sorted: usize,
    /// Number of records in the sorted and pending zones together.
    pub(crate) len: usize,
    /// Capacity management knobs.
    pub(crate) policy: GrowthPolicy,
    /// Record storage. `data.len()` is the buffer capacity in bytes; the
    /// bytes past `len * item_size` are zero.
    pub(crate) data: Vec<u8>,
}

impl DistinctAccumulator {
    /// Creates an empty accumulator for records of `item_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `item_size` is zero or does not fit the serialized format's
    /// 32-bit header fields.
    pub fn new(item_size: usize) -> Self {
        Self::with_policy(item_size, GrowthPolicy::default())
    }

    /// Creates an empty accumulator with an explicit growth policy.
    ///
    /// # Panics
    ///
    /// Panics if `item_size` is zero or does not fit the serialized format's
    /// 32-bit header fields.
    pub fn with_policy(item_size: usize, policy: GrowthPolicy) -> Self {
        assert!(item_size > 0, "item_size must be non-zero");
        assert!(
            item_size <= u32::MAX as usize,
            "item_size must fit the serialized header"
        );
        // The buffer must always have room for at least one record.
        let capacity = policy.initial_capacity.max(item_size);
        Self {
            item_size,
            sorted: 0,
            len: 0,
            policy,
            data: vec![0; capacity],
        }
    }

    /// Rebuilds an accumulator around records already in sorted distinct form.
    pub(crate) fn from_sorted_records(item_size: usize, records: Vec<u8>) -> Self {
        debug_assert!(item_size > 0);
        debug_assert_eq!(records.len() % item_size, 0);
        if records.is_empty() {
            return Self::new(item_size);
        }
        let count = records.len() / item_size;
        Self {
            item_size,
            sorted: count,
            len: count,
            policy: GrowthPolicy::default(),
            data: records,
        }
    }

    /// Appends one record to the pending zone, compacting first if the free
    /// zone is exhausted.
    ///
    /// Duplicates are accepted here and collapse on the next compaction.
    ///
    /// # Panics
    ///
    /// Panics if `record.len()` differs from the accumulator's item size.
    #[inline]
    pub fn push(&mut self, record: &[u8]) {
        assert_eq!(
            record.len(),
            self.item_size,
            "record width differs from the accumulator's item size"
        );
        if (self.len + 1) * self.item_size > self.data.len() {
            self.compact(true);
            debug_assert!((self.len + 1) * self.item_size <= self.data.len());
        }
        let at = self.len * self.item_size;
        self.data[at..at + self.item_size].copy_from_slice(record);
        self.len += 1;
    }

    /// Returns the exact number of distinct records observed so far.
    ///
    /// Compacts any pending records first, so the call takes `&mut self` and
    /// leaves the accumulator fully deduplicated.
    pub fn distinct_count(&mut self) -> usize {
        if self.len == 0 {
            return 0;
        }
        self.compact(false);
        self.len
    }

    /// Iterates over the distinct records in ascending byte order.
    ///
    /// Compacts any pending records first, like [`Self::distinct_count`].
    pub fn records(&mut self) -> impl Iterator<Item = &[u8]> + '_ {
        if self.len > 0 {
            self.compact(false);
        }
        self.data[..self.len * self.item_size].chunks_exact(self.item_size)
    }

    /// Returns the record width in bytes.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Returns `true` if no records have been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the memory size of the accumulator in bytes.
    #[inline]
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }

    /// Bytes of the sorted zone.
    #[inline]
    pub(crate) fn sorted_bytes(&self) -> &[u8] {
        &self.data[..self.sorted * self.item_size]
    }
}

impl<'a> Extend<&'a [u8]> for DistinctAccumulator {
    fn extend<T: IntoIterator<Item = &'a [u8]>>(&mut self, records: T) {
        for record in records {
            self.push(record);
        }
    }
}

impl Debug for DistinctAccumulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DistinctAccumulator {{ item_size: {}, distinct: {}, pending: {}, capacity: {} }}",
            self.item_size,
            self.sorted,
            self.len - self.sorted,
            self.data.len()
        )
    }
}
