//! Sharded LFU Cache
//!
//! [`LfuCache`](crate::LfuCache) serialises every operation behind one lock.
//! When many threads hit the cache at once, [`ConcurrentLfuCache`] spreads
//! keys across independently locked segments instead:
//!
//! - The key space is partitioned by hash; every key always maps to the same
//!   segment.
//! - Each segment is a complete LFU cache (store, frequency index, counters)
//!   behind its own `parking_lot::Mutex`.
//! - Operations lock only the segment owning the key.
//!
//! ## Why Mutex Instead of RwLock?
//!
//! Every `get()` increments a frequency and pushes onto the frequency heap, so
//! reads need exclusive access just like writes. A read lock would never be
//! taken. Parallelism comes from segmentation alone.
//!
//! ## Eviction Scope
//!
//! Frequencies are compared within a segment, not across the whole cache. A
//! new key evicts the least frequently used entry *of its own segment*, which
//! may be more popular than some entry elsewhere. The total entry count never
//! exceeds the configured capacity because segment capacities sum to it
//! exactly. Use [`LfuCache`](crate::LfuCache) when exact global LFU order
//! matters more than throughput.

mod lfu;

pub use self::lfu::ConcurrentLfuCache;
