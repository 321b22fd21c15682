//! Least Frequently Used Cache Implementation.
//!
//! The LFU cache evicts the entry with the smallest access count when a new
//! key arrives at a full cache, regardless of how recently that entry was
//! used. Two structures hold the state:
//!
//! - a [`Store`] binding keys to values, and
//! - a [`FrequencyIndex`] tracking each key's exact access count and
//!   answering "which key has the lowest count".
//!
//! Both live in an [`LfuSegment`] behind a single `parking_lot::Mutex`, so
//! every `get` and `put` updates them together and no caller ever observes
//! one without the other.
//!
//! ```text
//!            put(k, v)                              get(k)
//!               │                                     │
//!        ┌──────▼──────┐                        ┌─────▼─────┐
//!        │ k stored?   │── yes ─▶ overwrite v   │ k stored? │── no ─▶ miss += 1, None
//!        └──────┬──────┘          keep freq     └─────┬─────┘
//!              no                                    yes
//!        ┌──────▼──────┐                        ┌─────▼─────┐
//!        │ len ≥ cap?  │── yes ─▶ evict_min     │ hit += 1  │
//!        └──────┬──────┘          store.remove  │ bump(k)   │
//!               ▼                               └─────┬─────┘
//!     store.put, record_new_key                       ▼
//!                                                Some(v.clone())
//! ```
//!
//! # Semantics
//!
//! - New keys start at frequency 1; each successful `get` adds exactly 1.
//! - `put` on a live key replaces the value and keeps its frequency. It never
//!   evicts, because the entry count does not change.
//! - Among keys sharing the minimum frequency, the one that reached that
//!   frequency first is evicted.
//! - A miss is a normal outcome: `get` returns `None` and only the miss
//!   counter changes.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::config::{LfuCacheConfig, MIN_COMPACTION_RATIO};
use crate::error::LfuError;
use crate::frequency::FrequencyIndex;
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
use crate::store::Store;
use crate::traits::FixedSizeCache;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Unsynchronised LFU state shared by [`LfuCache`] and the sharded
/// `ConcurrentLfuCache`.
///
/// Every method takes `&mut self`; callers provide the mutual exclusion.
pub(crate) struct LfuSegment<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,
    store: Store<K, V, S>,
    index: FrequencyIndex<K, S>,
    metrics: LfuCacheMetrics,
}

impl<K, V, S> LfuSegment<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates an empty segment.
    pub(crate) fn with_hasher(mut config: LfuCacheConfig, hash_builder: S) -> Self {
        // Public field; may bypass the builder clamp.
        config.compaction_ratio = config.compaction_ratio.max(MIN_COMPACTION_RATIO);
        let capacity = config.capacity.get();
        LfuSegment {
            config,
            store: Store::with_capacity_and_hasher(capacity, hash_builder.clone()),
            index: FrequencyIndex::with_capacity_and_hasher(capacity, hash_builder)
                .with_compaction_ratio(config.compaction_ratio),
            metrics: LfuCacheMetrics::new(),
        }
    }

    #[inline]
    #[cfg_attr(not(feature = "concurrent"), allow(dead_code))]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.contains(key)
    }

    #[inline]
    pub(crate) fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.frequency_of(key)
    }

    /// Looks up `key`, counting a hit or a miss and bumping its frequency on a hit.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.store.contains(key) {
            self.metrics.record_miss();
            return None;
        }

        match self.index.bump(key) {
            Ok(frequency) => {
                self.metrics.record_frequency_hit(frequency);
                self.store.get(key)
            }
            Err(err) => {
                // Stored but untracked: drop the orphan and report a miss.
                self.internal_fault("get", &err);
                self.store.remove(key);
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Inserts or overwrites `key`. A new key into a full segment evicts first.
    pub(crate) fn put(&mut self, key: K, value: V) {
        if let Some(slot) = self.store.get_mut(&key) {
            *slot = value;
            self.metrics.core.record_update();
            return;
        }

        while self.store.len() >= self.config.capacity.get() {
            self.evict_one();
        }

        self.store.put(key.clone(), value);
        if let Err(err) = self.index.record_new_key(key) {
            // The index already tracked a key the store lacked; both agree again now.
            self.internal_fault("put", &err);
        }
        self.metrics.core.record_insertion();
    }

    /// Evicts the minimum-frequency entry from both structures.
    fn evict_one(&mut self) {
        match self.index.evict_min() {
            Ok((key, frequency)) => {
                if self.store.remove(&key).is_none() {
                    self.internal_fault(
                        "evict",
                        &LfuError::InvariantViolation("evicted key was not stored".to_string()),
                    );
                }
                self.metrics.record_eviction(frequency);
                trace!(
                    frequency,
                    len = self.store.len(),
                    "evicted least frequently used entry"
                );
            }
            Err(err) => {
                self.internal_fault("evict", &err);
                // Nothing tracked to evict: drop every untracked key instead.
                let orphans: Vec<K> = self
                    .store
                    .keys()
                    .filter(|key| !self.index.contains(*key))
                    .cloned()
                    .collect();
                for orphan in &orphans {
                    self.store.remove(orphan);
                    self.metrics.record_eviction(0);
                }
            }
        }
    }

    /// Key and frequency `put` would evict next if the segment were full.
    pub(crate) fn peek_eviction_candidate(&mut self) -> Option<(K, u64)> {
        self.index
            .peek_min()
            .map(|(key, frequency)| (key.clone(), frequency))
    }

    #[inline]
    pub(crate) fn hits(&self) -> u64 {
        self.metrics.core.cache_hits
    }

    #[inline]
    pub(crate) fn misses(&self) -> u64 {
        self.metrics.core.cache_misses
    }

    /// Snapshot of the counters, heap statistics included.
    pub(crate) fn metrics(&self) -> LfuCacheMetrics {
        let mut metrics = self.metrics.clone();
        metrics.sync_heap_stats(self.index.stale_entries_skipped(), self.index.compactions());
        metrics
    }

    /// Verifies that store and index hold the same keys and the size bound holds.
    pub(crate) fn check_invariants(&self) -> Result<(), LfuError> {
        if self.store.len() > self.config.capacity.get() {
            return Err(LfuError::InvariantViolation(format!(
                "{} entries exceed capacity {}",
                self.store.len(),
                self.config.capacity
            )));
        }
        if self.store.len() != self.index.len() {
            return Err(LfuError::InvariantViolation(format!(
                "store has {} keys, index has {}",
                self.store.len(),
                self.index.len()
            )));
        }
        if self.store.keys().any(|key| !self.index.contains(key)) {
            return Err(LfuError::InvariantViolation(
                "stored key missing from frequency index".to_string(),
            ));
        }
        self.index.check_invariants()
    }

    fn internal_fault(&self, operation: &'static str, err: &LfuError) {
        error!(
            operation,
            %err,
            store_len = self.store.len(),
            index_len = self.index.len(),
            "store and frequency index out of sync"
        );
        if cfg!(debug_assertions) {
            panic!("store and frequency index out of sync during {operation}: {err}");
        }
    }
}

impl<K, V, S> fmt::Debug for LfuSegment<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.store.len())
            .field("index", &self.index)
            .finish()
    }
}

/// A thread-safe, fixed-capacity Least Frequently Used cache.
///
/// All operations take `&self`; one exclusive lock covers the store, the
/// frequency index and the counters. `get` mutates frequency state, so there
/// is no separate read path.
///
/// # Examples
///
/// ```
/// use lfu_cache::LfuCache;
///
/// let cache = LfuCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(1)); // "a" now at frequency 2
///
/// cache.put("c", 3); // evicts "b", the only key at frequency 1
/// assert!(!cache.contains_key(&"b"));
/// assert_eq!(cache.hit_count(), 1);
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LfuSegment<K, V, S>>,
    capacity: NonZeroUsize,
}

impl<K, V> LfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// ```
    /// use lfu_cache::LfuCache;
    ///
    /// assert!(LfuCache::<u32, u32>::new(0).is_err());
    /// let cache: LfuCache<u32, u32> = LfuCache::new(8).unwrap();
    /// assert_eq!(cache.capacity(), 8);
    /// ```
    pub fn new(capacity: usize) -> Result<Self, LfuError> {
        Ok(Self::init(LfuCacheConfig::try_new(capacity)?))
    }

    /// Creates a cache from a configuration.
    pub fn init(config: LfuCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates a cache from a configuration with a custom hash builder.
    ///
    /// ```
    /// use lfu_cache::config::LfuCacheConfig;
    /// use lfu_cache::LfuCache;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let config = LfuCacheConfig::try_new(10).unwrap();
    /// let cache: LfuCache<&str, u32, _> = LfuCache::with_hasher(config, RandomState::new());
    /// cache.put("k", 1);
    /// assert_eq!(cache.get(&"k"), Some(1));
    /// ```
    pub fn with_hasher(mut config: LfuCacheConfig, hash_builder: S) -> Self {
        config.compaction_ratio = config.compaction_ratio.max(MIN_COMPACTION_RATIO);
        debug!(
            capacity = config.capacity.get(),
            compaction_ratio = config.compaction_ratio,
            "created LFU cache"
        );
        Self {
            segment: Mutex::new(LfuSegment::with_hasher(config, hash_builder)),
            capacity: config.capacity,
        }
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `key` with frequency 1, or overwrites the value of a live key
    /// while keeping its frequency.
    ///
    /// When a new key arrives at a full cache, the entry with the lowest
    /// frequency is evicted first.
    pub fn put(&self, key: K, value: V) {
        self.segment.lock().put(key, value);
    }

    /// Returns a clone of the value for `key` and increments its frequency.
    ///
    /// A missing key returns `None` and only increments the miss counter.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Applies `f` to the value for `key` while the lock is held.
    ///
    /// Counts as a `get`: hits bump the frequency, misses are counted.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Returns `true` if `key` is cached. Does not touch frequency or counters.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Current frequency of `key`. Does not touch frequency or counters.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().frequency(key)
    }

    /// Key and frequency the next eviction would remove.
    ///
    /// ```
    /// use lfu_cache::LfuCache;
    ///
    /// let cache = LfuCache::new(4).unwrap();
    /// cache.put("x", 1);
    /// cache.put("y", 2);
    /// cache.get(&"x");
    /// assert_eq!(cache.peek_eviction_candidate(), Some(("y", 1)));
    /// ```
    pub fn peek_eviction_candidate(&self) -> Option<(K, u64)> {
        self.segment.lock().peek_eviction_candidate()
    }

    /// Number of hits since construction.
    pub fn hit_count(&self) -> u64 {
        self.segment.lock().hits()
    }

    /// Number of misses since construction.
    pub fn miss_count(&self) -> u64 {
        self.segment.lock().misses()
    }

    /// Snapshot of all counters.
    pub fn lfu_metrics(&self) -> LfuCacheMetrics {
        self.segment.lock().metrics()
    }

    /// Checks the store/index consistency invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvariantViolation`] describing the first failure.
    pub fn check_invariants(&self) -> Result<(), LfuError> {
        self.segment.lock().check_invariants()
    }
}

impl<K, V, S> CacheMetrics for LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.lfu_metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}

impl<K, V, S> FixedSizeCache<K, V> for LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn put(&self, key: K, value: V) {
        LfuCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }

    fn capacity(&self) -> usize {
        LfuCache::capacity(self)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn hit_count(&self) -> u64 {
        LfuCache::hit_count(self)
    }

    fn miss_count(&self) -> u64 {
        LfuCache::miss_count(self)
    }
}

impl<K, V, S> fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.capacity)
            .field("segment", &*self.segment.lock())
            .finish()
    }
}
