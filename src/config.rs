//! Cache Configuration Module
//!
//! Configuration structs have public fields for simple instantiation, with a
//! couple of constructors for the common cases.
//!
//! # Sizing
//!
//! - **`capacity`**: maximum number of live entries. Eviction happens strictly
//!   before an insertion that would exceed it.
//! - **`compaction_ratio`**: the frequency heap keeps stale entries behind
//!   after every `get`. Once it holds more than `compaction_ratio` entries per
//!   live key it is rebuilt from the authoritative frequency map. Lower values
//!   bound memory tighter at the cost of more frequent rebuilds.
//!
//! ```text
//! heap memory ≈ capacity × compaction_ratio × (size_of::<K>() + 16)
//! ```
//!
//! # Examples
//!
//! ```
//! use lfu_cache::config::LfuCacheConfig;
//! use lfu_cache::LfuCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LfuCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//!     compaction_ratio: 8,
//! };
//! let cache: LfuCache<String, i32> = LfuCache::init(config);
//! assert_eq!(cache.capacity(), 1000);
//! ```

use core::fmt;
use core::num::NonZeroUsize;

use crate::error::LfuError;

/// Default number of heap entries allowed per live key before compaction.
pub const DEFAULT_COMPACTION_RATIO: usize = 4;

/// Smallest compaction ratio the frequency index accepts.
pub const MIN_COMPACTION_RATIO: usize = 2;

/// Configuration for an LFU (Least Frequently Used) cache.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LfuCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: NonZeroUsize,
    /// Heap entries allowed per live key before the heap is compacted.
    /// Values below 2 are treated as 2.
    pub compaction_ratio: usize,
}

impl LfuCacheConfig {
    /// Creates a configuration with the given capacity and the default compaction ratio.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            compaction_ratio: DEFAULT_COMPACTION_RATIO,
        }
    }

    /// Creates a configuration from a plain integer capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidCapacity`] if `capacity` is zero.
    ///
    /// ```
    /// use lfu_cache::config::LfuCacheConfig;
    /// use lfu_cache::LfuError;
    ///
    /// assert!(LfuCacheConfig::try_new(16).is_ok());
    /// assert_eq!(LfuCacheConfig::try_new(0), Err(LfuError::InvalidCapacity));
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, LfuError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(LfuError::InvalidCapacity)
    }

    /// Sets the compaction ratio, raising values below [`MIN_COMPACTION_RATIO`].
    #[must_use]
    pub fn with_compaction_ratio(mut self, ratio: usize) -> Self {
        self.compaction_ratio = ratio.max(MIN_COMPACTION_RATIO);
        self
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

impl fmt::Debug for LfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCacheConfig")
            .field("capacity", &self.capacity)
            .field("compaction_ratio", &self.compaction_ratio)
            .finish()
    }
}

/// Returns the default number of segments based on available parallelism.
#[cfg(feature = "concurrent")]
pub fn default_segment_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(16)
        .clamp(4, 64)
}

/// Generic configuration wrapper for concurrent caches.
///
/// Wraps a base cache configuration and adds the number of independently
/// locked segments. The `capacity` in the base config applies to the
/// **entire cache** and is split across segments.
///
/// # Example
///
/// ```
/// use lfu_cache::config::{ConcurrentCacheConfig, ConcurrentLfuCacheConfig, LfuCacheConfig};
/// use core::num::NonZeroUsize;
///
/// let config: ConcurrentLfuCacheConfig = ConcurrentCacheConfig {
///     base: LfuCacheConfig::new(NonZeroUsize::new(10_000).unwrap()),
///     segments: 16,
/// };
/// assert_eq!(config.segments, 16);
/// ```
#[cfg(feature = "concurrent")]
#[derive(Clone, Copy)]
pub struct ConcurrentCacheConfig<C> {
    /// Base configuration for the underlying cache algorithm.
    pub base: C,
    /// Number of segments for sharding (more segments = less contention)
    pub segments: usize,
}

#[cfg(feature = "concurrent")]
impl ConcurrentCacheConfig<LfuCacheConfig> {
    /// Creates a configuration with the default segment count, clamped to capacity.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            base: LfuCacheConfig::new(capacity),
            segments: default_segment_count().min(capacity.get()),
        }
    }

    /// Sets the number of segments.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Checks that the segment count is usable with the configured capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvalidSegments`] if there are no segments or more
    /// segments than capacity.
    pub fn validate(&self) -> Result<(), LfuError> {
        let capacity = self.base.capacity.get();
        if self.segments == 0 || self.segments > capacity {
            return Err(LfuError::InvalidSegments {
                segments: self.segments,
                capacity,
            });
        }
        Ok(())
    }
}

#[cfg(feature = "concurrent")]
impl<C: fmt::Debug> fmt::Debug for ConcurrentCacheConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentCacheConfig")
            .field("base", &self.base)
            .field("segments", &self.segments)
            .finish()
    }
}

#[cfg(feature = "concurrent")]
/// Configuration for a concurrent LFU cache.
/// Type alias for `ConcurrentCacheConfig<LfuCacheConfig>`.
pub type ConcurrentLfuCacheConfig = ConcurrentCacheConfig<LfuCacheConfig>;
