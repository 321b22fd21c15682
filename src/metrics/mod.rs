//! Cache Metrics System
//!
//! Counters are reported through the [`CacheMetrics`] trait as a
//! `BTreeMap<String, f64>` so the output order is deterministic, which keeps
//! test assertions and logged snapshots stable.
//!
//! The counters are plain integers updated inside the cache's critical
//! section; they are observational and play no part in eviction decisions.

use std::collections::BTreeMap;

pub mod lfu;

pub use lfu::LfuCacheMetrics;

/// Counters common to any fixed-size cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of `get` calls.
    pub requests: u64,

    /// `get` calls that found the key.
    pub cache_hits: u64,

    /// `get` calls that did not find the key.
    pub cache_misses: u64,

    /// New keys written by `put`.
    pub insertions: u64,

    /// `put` calls that overwrote the value of a live key.
    pub updates: u64,

    /// Entries discarded to make room for a new key.
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `get` that found its key.
    #[inline]
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a `get` that did not find its key.
    #[inline]
    pub fn record_miss(&mut self) {
        self.requests += 1;
        self.cache_misses += 1;
    }

    /// Records a `put` of a new key.
    #[inline]
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a `put` overwriting a live key.
    #[inline]
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an eviction.
    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Fraction of requests that hit, or 0.0 before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of requests that missed, or 0.0 before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Adds another set of counters into this one.
    pub fn merge(&mut self, other: &CoreCacheMetrics) {
        self.requests += other.requests;
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self.insertions += other.insertions;
        self.updates += other.updates;
        self.evictions += other.evictions;
    }

    /// Converts the counters to a map with deterministic key order.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting for cache implementations.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification, e.g. `"LFU"`.
    fn algorithm_name(&self) -> &'static str;
}
