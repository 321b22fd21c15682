//! Error types for the LFU cache.
//!
//! A cache miss is not an error: [`LfuCache::get`](crate::LfuCache::get)
//! returns `None`. The variants here cover invalid construction parameters
//! and precondition violations on the [`FrequencyIndex`](crate::FrequencyIndex),
//! which inside the cache facade indicate that the store and the index have
//! drifted apart.

use thiserror::Error;

/// Errors produced by cache construction and frequency bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LfuError {
    /// Capacity must be at least one entry.
    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    /// A sharded cache needs at least one segment and no more segments than entries.
    #[error("invalid segment count {segments} for capacity {capacity}")]
    InvalidSegments {
        /// Requested number of segments.
        segments: usize,
        /// Requested total capacity.
        capacity: usize,
    },

    /// Eviction was requested but no key is tracked.
    #[error("frequency index is empty")]
    EmptyIndex,

    /// The key is not tracked by the frequency index.
    #[error("key is not tracked by the frequency index")]
    UnknownKey,

    /// The key is already tracked by the frequency index.
    #[error("key is already tracked by the frequency index")]
    DuplicateKey,

    /// Store and frequency index disagree.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
