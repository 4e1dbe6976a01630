//! Stable byte-stream form of an accumulator.
//!
//! Worker processes serialize their partial states, ship them to a collector
//! and rebuild them there with [`DistinctAccumulator::from_bytes`]. The
//! stream is always fully compacted, so deserializing costs one allocation
//! and one copy.
//!
//! ## Serialized data format
//!
//! ```text
//! +-----------+--------------+-------------+----------+------------------+
//! | item_size | sorted_count | total_count | capacity |     records      |
//! |    u32    |     u32      |     u32     |   u32    | count * item_size|
//! +-----------+--------------+-------------+----------+------------------+
//! ```
//!
//! All header fields use native endianness; streams are an in-memory
//! transport format, not a portable one. `sorted_count` always equals
//! `total_count` and the records are strictly ascending. The capacity field
//! records the serializing side's buffer size and is not restored: the
//! records are reloaded into an exactly sized buffer instead.

use crate::accumulator::DistinctAccumulator;
use crate::compact::is_strictly_ascending;
use crate::error::Error;

/// Width of the four `u32` header fields in bytes.
const HEADER_LEN: usize = 16;

impl DistinctAccumulator {
    /// Serializes the accumulator into a standalone byte stream, compacting
    /// it first.
    ///
    /// Fails on an accumulator without records and on counts or capacities
    /// that overflow the header fields.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, Error> {
        if self.len == 0 {
            return Err(Error::EmptyState);
        }
        self.compact(false);
        debug_assert_eq!(self.sorted, self.len);

        let item_size = u32::try_from(self.item_size).map_err(|_| Error::StateTooLarge)?;
        let sorted = u32::try_from(self.sorted).map_err(|_| Error::StateTooLarge)?;
        let total = u32::try_from(self.len).map_err(|_| Error::StateTooLarge)?;
        let capacity = u32::try_from(self.data.len()).map_err(|_| Error::StateTooLarge)?;

        let records = self.sorted_bytes();
        let mut out = Vec::with_capacity(HEADER_LEN + records.len());
        for field in [item_size, sorted, total, capacity] {
            out.extend_from_slice(&field.to_ne_bytes());
        }
        out.extend_from_slice(records);
        Ok(out)
    }

    /// Rebuilds an accumulator from a byte stream produced by
    /// [`Self::to_bytes`].
    ///
    /// The stream is validated in full: header fields must be consistent
    /// with the stream length and the records must be strictly ascending.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Truncated {
                got: bytes.len(),
                want: HEADER_LEN,
            });
        }
        let item_size = header_field(bytes, 0) as usize;
        let sorted = header_field(bytes, 1) as usize;
        let total = header_field(bytes, 2) as usize;

        if item_size == 0 {
            return Err(Error::Corrupt("zero item size"));
        }
        if total == 0 {
            return Err(Error::Corrupt("no records"));
        }
        if sorted != total {
            return Err(Error::Corrupt("records not fully compacted"));
        }
        let payload = total
            .checked_mul(item_size)
            .ok_or(Error::Corrupt("record counts overflow"))?;
        let want = HEADER_LEN
            .checked_add(payload)
            .ok_or(Error::Corrupt("record counts overflow"))?;
        if bytes.len() < want {
            return Err(Error::Truncated {
                got: bytes.len(),
                want,
            });
        }
        if bytes.len() > want {
            return Err(Error::Corrupt("trailing bytes after records"));
        }

        let records = bytes[HEADER_LEN..].to_vec();
        if !is_strictly_ascending(&records, item_size) {
            return Err(Error::Corrupt("records not sorted"));
        }
        Ok(Self::from_sorted_records(item_size, records))
    }
}

#[inline]
fn header_field(bytes: &[u8], index: usize) -> u32 {
    let mut field = [0u8; 4];
    field.copy_from_slice(&bytes[index * 4..(index + 1) * 4]);
    u32::from_ne_bytes(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    fn accumulated(values: &[u32]) -> DistinctAccumulator {
        let mut acc = DistinctAccumulator::new(4);
        for value in values {
            acc.push(&value.to_be_bytes());
        }
        acc
    }

    fn with_header_field(bytes: &[u8], index: usize, value: u32) -> Vec<u8> {
        let mut patched = bytes.to_vec();
        patched[index * 4..(index + 1) * 4].copy_from_slice(&value.to_ne_bytes());
        patched
    }

    #[test]
    fn test_round_trip() {
        let mut acc = accumulated(&[30, 10, 30, 20, 10]);
        let bytes = acc.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 3 * 4);

        let mut back = DistinctAccumulator::from_bytes(&bytes).unwrap();
        assert_eq!(back.item_size(), 4);
        assert_eq!(back.distinct_count(), 3);
        assert_eq!(
            back.records().collect::<Vec<_>>(),
            acc.records().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_header_fields() {
        let mut acc = accumulated(&[10, 20, 30]);
        let bytes = acc.to_bytes().unwrap();
        assert_eq!(header_field(&bytes, 0), 4);
        assert_eq!(header_field(&bytes, 1), 3);
        assert_eq!(header_field(&bytes, 2), 3);
        // The capacity field reflects the serializing side's buffer.
        assert_eq!(header_field(&bytes, 3), 32);

        // Deserializing sizes the buffer to the records alone.
        let back = DistinctAccumulator::from_bytes(&bytes).unwrap();
        assert_eq!(back.capacity(), 12);
    }

    #[test]
    fn test_serialization_is_stable() {
        let mut acc = accumulated(&[7, 5, 7, 5, 3]);
        let first = acc.to_bytes().unwrap();
        let second = acc.to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_state() {
        let mut acc = DistinctAccumulator::new(4);
        assert_eq!(acc.to_bytes(), Err(Error::EmptyState));
    }

    #[test_case(0; "empty stream")]
    #[test_case(7; "partial header")]
    #[test_case(HEADER_LEN; "header only")]
    #[test_case(HEADER_LEN + 5; "partial records")]
    fn test_truncated(keep: usize) {
        let mut acc = accumulated(&[10, 20, 30]);
        let bytes = acc.to_bytes().unwrap();
        let err = DistinctAccumulator::from_bytes(&bytes[..keep]).unwrap_err();
        assert!(matches!(err, Error::Truncated { got, .. } if got == keep));
    }

    #[test]
    fn test_corrupt_record_count() {
        let mut acc = accumulated(&[10, 20, 30]);
        let bytes = acc.to_bytes().unwrap();

        // Counts larger than the payload leave the stream short.
        let grown = with_header_field(&with_header_field(&bytes, 1, 4), 2, 4);
        assert_eq!(
            DistinctAccumulator::from_bytes(&grown).unwrap_err(),
            Error::Truncated { got: 28, want: 32 }
        );

        // Counts smaller than the payload leave stray bytes behind.
        let shrunk = with_header_field(&with_header_field(&bytes, 1, 2), 2, 2);
        assert_eq!(
            DistinctAccumulator::from_bytes(&shrunk).unwrap_err(),
            Error::Corrupt("trailing bytes after records")
        );
    }

    #[test]
    fn test_corrupt_header_fields() {
        let mut acc = accumulated(&[10, 20, 30]);
        let bytes = acc.to_bytes().unwrap();

        assert_eq!(
            DistinctAccumulator::from_bytes(&with_header_field(&bytes, 0, 0)).unwrap_err(),
            Error::Corrupt("zero item size")
        );
        let emptied = with_header_field(&with_header_field(&bytes[..HEADER_LEN], 1, 0), 2, 0);
        assert_eq!(
            DistinctAccumulator::from_bytes(&emptied).unwrap_err(),
            Error::Corrupt("no records")
        );
        assert_eq!(
            DistinctAccumulator::from_bytes(&with_header_field(&bytes, 1, 2)).unwrap_err(),
            Error::Corrupt("records not fully compacted")
        );
        assert_eq!(
            DistinctAccumulator::from_bytes(&with_header_field(&bytes, 1, u32::MAX)).unwrap_err(),
            Error::Corrupt("records not fully compacted")
        );
    }

    #[test]
    fn test_unsorted_records_rejected() {
        let mut acc = accumulated(&[10, 20]);
        let mut bytes = acc.to_bytes().unwrap();

        // Swap the two records so the payload is descending.
        let (first, second) = (bytes[16..20].to_vec(), bytes[20..24].to_vec());
        bytes[16..20].copy_from_slice(&second);
        bytes[20..24].copy_from_slice(&first);
        assert_eq!(
            DistinctAccumulator::from_bytes(&bytes).unwrap_err(),
            Error::Corrupt("records not sorted")
        );

        // Duplicate records are rejected as well.
        bytes[20..24].copy_from_slice(&second);
        assert_eq!(
            DistinctAccumulator::from_bytes(&bytes).unwrap_err(),
            Error::Corrupt("records not sorted")
        );
    }

    #[test]
    fn test_deserialized_accumulator_accepts_pushes() {
        let mut acc = accumulated(&[1, 3]);
        let bytes = acc.to_bytes().unwrap();
        let mut back = DistinctAccumulator::from_bytes(&bytes).unwrap();
        back.push(&2u32.to_be_bytes());
        back.push(&3u32.to_be_bytes());
        assert_eq!(back.distinct_count(), 3);
    }
}
