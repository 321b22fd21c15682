//! Concurrent LFU Cache Implementation
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      ConcurrentLfuCache                              │
//! │                                                                      │
//! │  (hash(key) >> 32) % N  ──▶  Segment Selection                       │
//! │                                                                      │
//! │  ┌──────────────┐ ┌──────────────┐     ┌──────────────┐              │
//! │  │  Segment 0   │ │  Segment 1   │ ... │  Segment N-1 │              │
//! │  │  Mutex<      │ │  Mutex<      │     │  Mutex<      │              │
//! │  │  LfuSegment> │ │  LfuSegment> │     │  LfuSegment> │              │
//! │  └──────────────┘ └──────────────┘     └──────────────┘              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Segment capacities are `capacity / N`, with the first `capacity % N`
//! segments taking one extra slot.
//!
//! # Example
//!
//! ```
//! use lfu_cache::concurrent::ConcurrentLfuCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentLfuCache::new(10_000).unwrap());
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for j in 0..1000 {
//!             let key = format!("key-{}-{}", i, j);
//!             cache.put(key.clone(), j);
//!             if j % 10 == 0 {
//!                 for _ in 0..5 {
//!                     let _ = cache.get(&key);
//!                 }
//!             }
//!         }
//!     })
//! }).collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(cache.len(), 4000);
//! assert_eq!(cache.hit_count(), 4 * 100 * 5);
//! ```

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::{ConcurrentLfuCacheConfig, LfuCacheConfig};
use crate::error::LfuError;
use crate::lfu::LfuSegment;
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
use crate::traits::FixedSizeCache;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe LFU cache with segmented storage for high concurrency.
///
/// Eviction is exact LFU within each segment. See the
/// [module documentation](crate::concurrent) for how that differs from
/// [`LfuCache`](crate::LfuCache).
pub struct ConcurrentLfuCache<K, V, S = DefaultHashBuilder> {
    segments: Box<[Mutex<LfuSegment<K, V, S>>]>,
    hash_builder: S,
    capacity: NonZeroUsize,
}

impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache with the given total capacity and the default segment count.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, LfuError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(LfuError::InvalidCapacity)?;
        Self::init(ConcurrentLfuCacheConfig::new(capacity))
    }

    /// Creates a cache from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidSegments`] if the segment count is zero or
    /// larger than the capacity.
    ///
    /// ```
    /// use lfu_cache::concurrent::ConcurrentLfuCache;
    /// use lfu_cache::config::ConcurrentLfuCacheConfig;
    /// use core::num::NonZeroUsize;
    ///
    /// let config = ConcurrentLfuCacheConfig::new(NonZeroUsize::new(10).unwrap()).with_segments(3);
    /// let cache: ConcurrentLfuCache<u64, u64> = ConcurrentLfuCache::init(config).unwrap();
    /// assert_eq!(cache.segment_count(), 3);
    /// assert_eq!(cache.capacity(), 10);
    /// ```
    pub fn init(config: ConcurrentLfuCacheConfig) -> Result<Self, LfuError> {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ConcurrentLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates a cache from a configuration with a custom hash builder.
    ///
    /// The same hasher selects segments and backs every segment's maps.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidSegments`] if the segment count is zero or
    /// larger than the capacity.
    pub fn with_hasher(config: ConcurrentLfuCacheConfig, hash_builder: S) -> Result<Self, LfuError> {
        config.validate()?;

        let capacity = config.base.capacity;
        let segment_count = config.segments;
        let base = capacity.get() / segment_count;
        let extra = capacity.get() % segment_count;

        let segments = (0..segment_count)
            .map(|i| {
                let segment_cap = base + usize::from(i < extra);
                let segment_cap = NonZeroUsize::new(segment_cap).ok_or(LfuError::InvalidSegments {
                    segments: segment_count,
                    capacity: capacity.get(),
                })?;
                let segment_config = LfuCacheConfig {
                    capacity: segment_cap,
                    compaction_ratio: config.base.compaction_ratio,
                };
                Ok(Mutex::new(LfuSegment::with_hasher(
                    segment_config,
                    hash_builder.clone(),
                )))
            })
            .collect::<Result<Vec<_>, LfuError>>()?;

        debug!(
            capacity = capacity.get(),
            segments = segment_count,
            "created concurrent LFU cache"
        );

        Ok(Self {
            segments: segments.into_boxed_slice(),
            hash_builder,
            capacity,
        })
    }

    #[inline]
    fn segment_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        ((self.hash_builder.hash_one(key) >> 32) as usize) % self.segments.len()
    }

    #[inline]
    fn segment_for<Q>(&self, key: &Q) -> &Mutex<LfuSegment<K, V, S>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        &self.segments[self.segment_index(key)]
    }

    /// Total capacity across all segments.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of independently locked segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Capacity of each segment, in segment order.
    pub fn segment_capacities(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.lock().cap().get()).collect()
    }

    /// Total number of entries across all segments.
    ///
    /// Segments are locked one at a time, so under concurrent writes the
    /// result is a sum of per-segment snapshots.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.lock().len()).sum()
    }

    /// Returns `true` if no segment holds an entry.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.lock().len() == 0)
    }

    /// Returns a clone of the value for `key`, incrementing its frequency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment_for(key).lock().get(key).cloned()
    }

    /// Applies `f` to the value for `key` while its segment is locked.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment_for(key).lock().get(key).map(f)
    }

    /// Inserts or overwrites `key`.
    ///
    /// A new key arriving at a full segment evicts that segment's least
    /// frequently used entry.
    pub fn put(&self, key: K, value: V) {
        let idx = self.segment_index(&key);
        self.segments[idx].lock().put(key, value);
    }

    /// Returns `true` if `key` is cached. Does not touch frequency or counters.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment_for(key).lock().contains_key(key)
    }

    /// Current frequency of `key`. Does not touch frequency or counters.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment_for(key).lock().frequency(key)
    }

    /// Entry a new key hashing next to `key` would evict from its segment.
    pub fn peek_eviction_candidate<Q>(&self, key: &Q) -> Option<(K, u64)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.segment_for(key).lock().peek_eviction_candidate()
    }

    /// Hits summed over all segments.
    pub fn hit_count(&self) -> u64 {
        self.segments.iter().map(|s| s.lock().hits()).sum()
    }

    /// Misses summed over all segments.
    pub fn miss_count(&self) -> u64 {
        self.segments.iter().map(|s| s.lock().misses()).sum()
    }

    /// Counters merged across segments.
    pub fn lfu_metrics(&self) -> LfuCacheMetrics {
        let mut merged = LfuCacheMetrics::new();
        for segment in self.segments.iter() {
            merged.merge(&segment.lock().metrics());
        }
        merged
    }

    /// Checks every segment's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first segment's [`LfuError::InvariantViolation`].
    pub fn check_invariants(&self) -> Result<(), LfuError> {
        for (i, segment) in self.segments.iter().enumerate() {
            segment.lock().check_invariants().map_err(|err| {
                LfuError::InvariantViolation(format!("segment {}: {}", i, err))
            })?;
        }
        Ok(())
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.lfu_metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentLFU"
    }
}

impl<K, V, S> FixedSizeCache<K, V> for ConcurrentLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn put(&self, key: K, value: V) {
        ConcurrentLfuCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ConcurrentLfuCache::get(self, key)
    }

    fn capacity(&self) -> usize {
        ConcurrentLfuCache::capacity(self)
    }

    fn len(&self) -> usize {
        ConcurrentLfuCache::len(self)
    }

    fn hit_count(&self) -> u64 {
        ConcurrentLfuCache::hit_count(self)
    }

    fn miss_count(&self) -> u64 {
        ConcurrentLfuCache::miss_count(self)
    }
}

impl<K, V, S> fmt::Debug for ConcurrentLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentLfuCache")
            .field("capacity", &self.capacity)
            .field("segment_count", &self.segments.len())
            .field("total_len", &self.len())
            .finish()
    }
}
