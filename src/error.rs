//! Errors surfaced at the accumulator's boundaries.
//!
//! Logic errors made by the embedding code itself, such as pushing a record
//! of the wrong width, are reported with panics instead; see the individual
//! method docs on [`crate::DistinctAccumulator`].

use thiserror::Error;

/// Error type for merge and serialization operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Two accumulators tracking records of different widths were merged.
    #[error("item size mismatch: cannot merge {left} byte records with {right} byte records")]
    ItemSizeMismatch { left: usize, right: usize },
    /// An accumulator holding no records was serialized. Hosts represent
    /// "no input seen" as an absent state rather than an empty stream.
    #[error("accumulator without records has no serialized form")]
    EmptyState,
    /// Record counts or capacity no longer fit the 32-bit header fields.
    #[error("accumulator state too large for the serialized format")]
    StateTooLarge,
    /// Serialized input ends before the header-declared payload does.
    #[error("serialized state truncated: got {got} bytes, need {want}")]
    Truncated { got: usize, want: usize },
    /// Serialized input is inconsistent with its own header.
    #[error("serialized state corrupt: {0}")]
    Corrupt(&'static str),
}
