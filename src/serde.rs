//! # Serde module for DistinctAccumulator
//!
//! This module provides serde-based (serialization and deserialization)
//! features for `DistinctAccumulator`.
//!
//! The accumulator serializes as a two element tuple: the item size and the
//! fully deduplicated record bytes in ascending order. Pending records are
//! compacted into the serialized form on the fly, so serialization does not
//! require `&mut` access and the accumulator itself is left untouched.
//!
//! During deserialization the tuple is validated before the accumulator is
//! rebuilt: the item size must be non-zero and the record bytes must form
//! whole, strictly ascending records.
//!
//! Unlike [`DistinctAccumulator::to_bytes`], an accumulator without records
//! round-trips here. Hosts that treat "no input seen" as an absent state can
//! wrap the accumulator in `Option` instead.

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::accumulator::DistinctAccumulator;
use crate::compact::is_strictly_ascending;

impl Serialize for DistinctAccumulator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let records = self.compacted_records();
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.item_size())?;
        tup.serialize_element(records.as_ref())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for DistinctAccumulator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (item_size, records): (usize, Vec<u8>) = Deserialize::deserialize(deserializer)?;
        if item_size == 0 || item_size > u32::MAX as usize {
            return Err(Error::custom("item size out of range"));
        }
        if !is_strictly_ascending(&records, item_size) {
            return Err(Error::custom(
                "records must be whole, distinct and ascending",
            ));
        }
        Ok(DistinctAccumulator::from_sorted_records(item_size, records))
    }
}
