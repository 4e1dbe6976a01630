//! Pairwise combination of independently built accumulators.
//!
//! Parallel pipelines shard their input, accumulate each shard on its own
//! worker and fold the partial states together at the end. Merging two
//! compacted accumulators is a single duplicate-eliminating pass over both
//! sorted zones, so the fold costs no more than one extra compaction per
//! shard.

use crate::accumulator::DistinctAccumulator;
use crate::compact::merge_distinct;
use crate::error::Error;

impl DistinctAccumulator {
    /// Folds every record of `other` into `self`, leaving `self` fully
    /// compacted. The distinct records afterwards are exactly the set union
    /// of both sides.
    ///
    /// Fails if the accumulators track records of different widths.
    pub fn merge(&mut self, mut other: Self) -> Result<(), Error> {
        if self.item_size != other.item_size {
            return Err(Error::ItemSizeMismatch {
                left: self.item_size,
                right: other.item_size,
            });
        }
        if other.len == 0 {
            return Ok(());
        }
        if self.len == 0 {
            self.data = other.data;
            self.sorted = other.sorted;
            self.len = other.len;
            return Ok(());
        }

        self.compact(false);
        other.compact(false);

        let mut merged = Vec::with_capacity(self.sorted_bytes().len() + other.sorted_bytes().len());
        merge_distinct(
            self.sorted_bytes().chunks_exact(self.item_size),
            other.sorted_bytes().chunks_exact(other.item_size),
            &mut merged,
        );
        let distinct = merged.len() / self.item_size;
        self.data = merged;
        self.sorted = distinct;
        self.len = distinct;
        Ok(())
    }

    /// Combines two optionally-present partial states, treating an absent
    /// state as the identity: if either side is `None`, the other is
    /// returned unchanged.
    pub fn combine(left: Option<Self>, right: Option<Self>) -> Result<Option<Self>, Error> {
        match (left, right) {
            (None, right) => Ok(right),
            (left, None) => Ok(left),
            (Some(mut left), Some(right)) => {
                left.merge(right)?;
                Ok(Some(left))
            }
        }
    }
}
