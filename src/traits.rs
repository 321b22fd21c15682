//! The contract shared by every fixed-size cache in this crate.

/// A bounded, thread-safe key-value cache.
///
/// Implementors take `&self` for both reads and writes and synchronise
/// internally, so a single instance can be shared across threads.
///
/// ```
/// use lfu_cache::{FixedSizeCache, LfuCache};
///
/// fn warm<C: FixedSizeCache<u32, String>>(cache: &C) {
///     for i in 0..3 {
///         cache.put(i, i.to_string());
///     }
/// }
///
/// let cache = LfuCache::new(2).unwrap();
/// warm(&cache);
/// assert_eq!(cache.len(), 2);
/// assert_eq!(FixedSizeCache::get(&cache, &2), Some("2".to_string()));
/// ```
pub trait FixedSizeCache<K, V> {
    /// Inserts or overwrites `key`, evicting first if the cache is full.
    fn put(&self, key: K, value: V);

    /// Returns a clone of the value for `key`, or `None` on a miss.
    fn get(&self, key: &K) -> Option<V>;

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `get` calls that found their key since construction.
    fn hit_count(&self) -> u64;

    /// Number of `get` calls that missed since construction.
    fn miss_count(&self) -> u64;
}
