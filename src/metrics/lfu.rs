//! LFU Cache Metrics
//!
//! Frequency-side counters layered on top of [`CoreCacheMetrics`].

use std::collections::BTreeMap;

use super::{CacheMetrics, CoreCacheMetrics};

/// LFU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LfuCacheMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Total number of frequency increments (one per hit)
    pub total_frequency_increments: u64,

    /// Highest frequency any key has reached
    pub max_frequency: u64,

    /// Highest frequency any evicted key had reached
    pub max_evicted_frequency: u64,

    /// Stale heap entries discarded by eviction or compaction
    pub stale_entries_skipped: u64,

    /// Number of frequency heap rebuilds
    pub compactions: u64,
}

impl LfuCacheMetrics {
    /// Creates zeroed LFU metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit that raised a key's frequency to `new_frequency`.
    pub fn record_frequency_hit(&mut self, new_frequency: u64) {
        self.core.record_hit();
        self.total_frequency_increments += 1;
        self.max_frequency = self.max_frequency.max(new_frequency);
    }

    /// Records a miss.
    #[inline]
    pub fn record_miss(&mut self) {
        self.core.record_miss();
    }

    /// Records the eviction of a key that had reached `frequency`.
    pub fn record_eviction(&mut self, frequency: u64) {
        self.core.record_eviction();
        self.max_evicted_frequency = self.max_evicted_frequency.max(frequency);
    }

    /// Copies heap maintenance counters from the frequency index.
    pub fn sync_heap_stats(&mut self, stale_entries_skipped: u64, compactions: u64) {
        self.stale_entries_skipped = stale_entries_skipped;
        self.compactions = compactions;
    }

    /// Adds another set of counters into this one; maxima are kept, not summed.
    pub fn merge(&mut self, other: &LfuCacheMetrics) {
        self.core.merge(&other.core);
        self.total_frequency_increments += other.total_frequency_increments;
        self.max_frequency = self.max_frequency.max(other.max_frequency);
        self.max_evicted_frequency = self.max_evicted_frequency.max(other.max_evicted_frequency);
        self.stale_entries_skipped += other.stale_entries_skipped;
        self.compactions += other.compactions;
    }

    /// Converts LFU metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        metrics.insert(
            "total_frequency_increments".to_string(),
            self.total_frequency_increments as f64,
        );
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert(
            "max_evicted_frequency".to_string(),
            self.max_evicted_frequency as f64,
        );
        metrics.insert(
            "stale_entries_skipped".to_string(),
            self.stale_entries_skipped as f64,
        );
        metrics.insert("compactions".to_string(), self.compactions as f64);

        metrics
    }
}

impl CacheMetrics for LfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}
