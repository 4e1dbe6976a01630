//! `count-distinct` is a Rust crate for counting the number of distinct fixed width elements in a stream or dataset, exactly and without hashing.
//!
//! Records accumulate in a single flat buffer and are deduplicated in sorted batches, which keeps
//! per-record overhead at zero bytes and makes duplicate-heavy streams settle into a fixed
//! memory footprint. Partial accumulators built in parallel can be combined, and serialize into
//! a compact byte stream for transport between processes.
//!
//! ```
//! use count_distinct::DistinctAccumulator;
//!
//! let mut acc = DistinctAccumulator::new(8);
//! for value in [3u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5] {
//!     acc.push(&value.to_be_bytes());
//! }
//! assert_eq!(acc.distinct_count(), 7);
//! ```
mod accumulator;
mod compact;
mod error;
mod merge;
#[cfg(feature = "with_serde")]
mod serde;
mod serialize;

pub use accumulator::DistinctAccumulator;
pub use compact::GrowthPolicy;
pub use error::Error;
