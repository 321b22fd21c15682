#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## How the pieces fit
//!
//! ```text
//! ┌──────────────────────── LfuCache ─────────────────────────┐
//! │  parking_lot::Mutex                                       │
//! │  ┌─────────────────────── LfuSegment ──────────────────┐  │
//! │  │                                                     │  │
//! │  │   Store              FrequencyIndex                 │  │
//! │  │   key ─▶ value       key ─▶ (frequency, seq)        │  │
//! │  │                      min-heap of (frequency, seq)   │  │
//! │  │                                                     │  │
//! │  │   LfuCacheMetrics    hits, misses, evictions, ...   │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `get` hit | O(log n) amortised (one heap push) |
//! | `get` miss | O(1) |
//! | `put` update | O(1) |
//! | `put` insert with eviction | O(log n) amortised |
//! | `contains_key`, `frequency` | O(1) |
//!
//! Each `get` leaves one stale heap entry behind; the heap is rebuilt once it
//! holds more than [`LfuCacheConfig::compaction_ratio`](config::LfuCacheConfig)
//! entries per live key.
//!
//! ## Modules
//!
//! - [`lfu`]: the thread-safe [`LfuCache`]
//! - [`frequency`]: exact per-key frequencies and minimum-frequency lookup
//! - [`store`]: key-to-value storage
//! - [`config`]: capacity and compaction settings
//! - [`metrics`]: hit, miss and eviction counters
//! - [`traits`]: the [`FixedSizeCache`] contract
//! - [`error`]: [`LfuError`]
//! - [`concurrent`]: sharded [`ConcurrentLfuCache`] (requires `concurrent` feature)

#[cfg(test)]
extern crate scoped_threadpool;

/// Error type shared by every fallible operation.
pub mod error;

/// Cache configuration structures.
pub mod config;

/// Key-value storage for live entries.
pub mod store;

/// Exact access-frequency tracking with minimum-frequency lookup.
///
/// Keeps an authoritative per-key frequency map alongside a min-heap that may
/// hold stale entries; stale entries are skipped on eviction and dropped by
/// periodic compaction.
pub mod frequency;

/// Least Frequently Used (LFU) cache implementation.
pub mod lfu;

/// Cache metrics system.
///
/// Counters for hits, misses, insertions and evictions, reported through the
/// [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

/// Common interface for fixed-size caches.
pub mod traits;

/// Sharded LFU cache for high-contention workloads.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use config::LfuCacheConfig;
pub use error::LfuError;
pub use frequency::FrequencyIndex;
pub use lfu::LfuCache;
pub use metrics::{CacheMetrics, LfuCacheMetrics};
pub use store::Store;
pub use traits::FixedSizeCache;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentLfuCache;
