//! Exact frequency accounting with lazy-deletion min-heap eviction.
//!
//! The index keeps two structures:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  stamps: HashMap<K, Stamp>        (authoritative)                │
//! │                                                                  │
//! │    "a" → { frequency: 3, seq: 7 }                                │
//! │    "b" → { frequency: 1, seq: 1 }                                │
//! │                                                                  │
//! │  heap: BinaryHeap<Reverse<(frequency, seq, key)>>                │
//! │                                                                  │
//! │    (1, 1, "b")   fresh, matches stamps["b"]                      │
//! │    (1, 0, "a")   stale, stamps["a"].seq is 7                     │
//! │    (2, 4, "a")   stale                                           │
//! │    (3, 7, "a")   fresh                                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every frequency change pushes a new heap entry carrying a fresh, globally
//! increasing sequence number and records that stamp in the map. Older
//! entries for the same key stay in the heap but no longer match the map, so
//! [`evict_min`](FrequencyIndex::evict_min) discards them when they surface.
//!
//! ## Tie-break
//!
//! The heap orders by `(frequency, seq)`. Among keys sharing the minimum
//! frequency, the one that reached that frequency first (lowest sequence
//! number) is evicted: the key that has gone untouched longest at that level.
//!
//! ## Compaction
//!
//! Stale entries accumulate with every bump. When the heap holds more than
//! `compaction_ratio` entries per live key it is rebuilt from the map. The
//! rebuild reuses the recorded stamps, so eviction order is unchanged.
//!
//! | Operation        | Complexity         |
//! |------------------|--------------------|
//! | `record_new_key` | O(log n)           |
//! | `bump`           | O(log n)           |
//! | `remove`         | O(1)               |
//! | `evict_min`      | amortised O(log n) |
//! | `compact`        | O(n)               |

use core::borrow::Borrow;
use core::cmp::{Ordering, Reverse};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::config::DEFAULT_COMPACTION_RATIO;
use crate::error::LfuError;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Heaps smaller than this are never compacted.
const MIN_COMPACTION_LEN: usize = 64;

/// Identifies the single fresh heap entry of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    frequency: u64,
    seq: u64,
}

#[derive(Debug, Clone)]
struct HeapEntry<K> {
    frequency: u64,
    seq: u64,
    key: K,
}

impl<K> HeapEntry<K> {
    #[inline]
    fn stamp(&self) -> Stamp {
        Stamp {
            frequency: self.frequency,
            seq: self.seq,
        }
    }
}

impl<K> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.seq == other.seq
    }
}

impl<K> Eq for HeapEntry<K> {}

impl<K> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for HeapEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Per-key access frequencies with minimum-frequency extraction.
///
/// # Example
///
/// ```
/// use lfu_cache::FrequencyIndex;
///
/// let mut index: FrequencyIndex<&str> = FrequencyIndex::new();
/// index.record_new_key("a").unwrap();
/// index.record_new_key("b").unwrap();
/// assert_eq!(index.bump(&"a"), Ok(2));
///
/// assert_eq!(index.evict_min(), Ok(("b", 1)));
/// assert_eq!(index.evict_min(), Ok(("a", 2)));
/// assert!(index.evict_min().is_err());
/// ```
pub struct FrequencyIndex<K, S = DefaultHashBuilder> {
    stamps: HashMap<K, Stamp, S>,
    heap: BinaryHeap<Reverse<HeapEntry<K>>>,
    next_seq: u64,
    compaction_ratio: usize,
    stale_skipped: u64,
    compactions: u64,
}

impl<K: Hash + Eq + Clone> FrequencyIndex<K> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index sized for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone> Default for FrequencyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> FrequencyIndex<K, S> {
    /// Creates an empty index sized for `capacity` keys using `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            stamps: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
            compaction_ratio: DEFAULT_COMPACTION_RATIO,
            stale_skipped: 0,
            compactions: 0,
        }
    }

    /// Sets how many heap entries per live key are tolerated before compaction.
    ///
    /// Ratios below 2 are raised to 2 so compaction stays amortised.
    #[must_use]
    pub fn with_compaction_ratio(mut self, ratio: usize) -> Self {
        self.compaction_ratio = ratio.max(2);
        self
    }

    /// Number of tracked keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns `true` if no key is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Number of heap entries, stale ones included.
    #[inline]
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    /// Total stale heap entries discarded so far.
    #[inline]
    pub fn stale_entries_skipped(&self) -> u64 {
        self.stale_skipped
    }

    /// Number of heap rebuilds performed so far.
    #[inline]
    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    /// Returns `true` if `key` is tracked.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.stamps.contains_key(key)
    }

    /// Current frequency of `key`, if tracked.
    #[inline]
    pub fn frequency_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.stamps.get(key).map(|stamp| stamp.frequency)
    }

    /// Iterates over tracked keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.stamps.keys()
    }

    /// Iterates over `(key, frequency)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.stamps.iter().map(|(key, stamp)| (key, stamp.frequency))
    }

    /// Starts tracking `key` at frequency 1.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::DuplicateKey`] if `key` is already tracked.
    pub fn record_new_key(&mut self, key: K) -> Result<(), LfuError> {
        if self.stamps.contains_key(&key) {
            return Err(LfuError::DuplicateKey);
        }
        let stamp = self.next_stamp(1);
        self.stamps.insert(key.clone(), stamp);
        self.push(key, stamp);
        Ok(())
    }

    /// Increments the frequency of `key` and returns the new value.
    ///
    /// The previous heap entry for `key` becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::UnknownKey`] if `key` is not tracked.
    pub fn bump<Q>(&mut self, key: &Q) -> Result<u64, LfuError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (owned, current) = self
            .stamps
            .get_key_value(key)
            .map(|(k, stamp)| (k.clone(), *stamp))
            .ok_or(LfuError::UnknownKey)?;

        let stamp = self.next_stamp(current.frequency.saturating_add(1));
        if let Some(slot) = self.stamps.get_mut(key) {
            *slot = stamp;
        }
        self.push(owned, stamp);
        Ok(stamp.frequency)
    }

    /// Removes and returns the key with the smallest frequency.
    ///
    /// Ties go to the key that reached that frequency first.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::EmptyIndex`] if no key is tracked.
    pub fn evict_min(&mut self) -> Result<(K, u64), LfuError> {
        if self.stamps.is_empty() {
            self.stale_skipped += self.heap.len() as u64;
            self.heap.clear();
            return Err(LfuError::EmptyIndex);
        }
        while let Some(Reverse(entry)) = self.heap.pop() {
            if self.is_fresh(&entry) {
                self.stamps.remove(&entry.key);
                return Ok((entry.key, entry.frequency));
            }
            self.stale_skipped += 1;
        }
        Err(LfuError::EmptyIndex)
    }

    /// Returns the key [`evict_min`](Self::evict_min) would remove next.
    ///
    /// Stale entries on top of the heap are discarded along the way, hence
    /// `&mut self`.
    pub fn peek_min(&mut self) -> Option<(&K, u64)> {
        loop {
            let fresh = match self.heap.peek() {
                Some(Reverse(entry)) => self.is_fresh(entry),
                None => return None,
            };
            if fresh {
                break;
            }
            self.heap.pop();
            self.stale_skipped += 1;
        }
        self.heap
            .peek()
            .map(|Reverse(entry)| (&entry.key, entry.frequency))
    }

    /// Stops tracking `key` and returns its last frequency.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::UnknownKey`] if `key` is not tracked.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<u64, LfuError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let stamp = self.stamps.remove(key).ok_or(LfuError::UnknownKey)?;
        self.maybe_compact();
        Ok(stamp.frequency)
    }

    /// Rebuilds the heap from the authoritative stamps, dropping stale entries.
    pub fn compact(&mut self) {
        let before = self.heap.len();
        let entries: Vec<_> = self
            .stamps
            .iter()
            .map(|(key, stamp)| {
                Reverse(HeapEntry {
                    frequency: stamp.frequency,
                    seq: stamp.seq,
                    key: key.clone(),
                })
            })
            .collect();
        self.heap = BinaryHeap::from(entries);
        self.stale_skipped += before.saturating_sub(self.heap.len()) as u64;
        self.compactions += 1;
        trace!(before, after = self.heap.len(), "compacted frequency heap");
    }

    /// Verifies that every tracked key has exactly one fresh heap entry.
    ///
    /// # Errors
    ///
    /// Returns [`LfuError::InvariantViolation`] describing the first mismatch.
    pub fn check_invariants(&self) -> Result<(), LfuError> {
        let fresh = self
            .heap
            .iter()
            .filter(|Reverse(entry)| self.is_fresh(entry))
            .count();
        if fresh != self.stamps.len() {
            return Err(LfuError::InvariantViolation(format!(
                "{} tracked keys but {} fresh heap entries",
                self.stamps.len(),
                fresh
            )));
        }
        if let Some(stamp) = self.stamps.values().find(|stamp| stamp.frequency == 0) {
            return Err(LfuError::InvariantViolation(format!(
                "zero frequency recorded at sequence {}",
                stamp.seq
            )));
        }
        Ok(())
    }

    #[inline]
    fn is_fresh(&self, entry: &HeapEntry<K>) -> bool {
        self.stamps
            .get(&entry.key)
            .is_some_and(|stamp| *stamp == entry.stamp())
    }

    #[inline]
    fn next_stamp(&mut self, frequency: u64) -> Stamp {
        let stamp = Stamp {
            frequency,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        stamp
    }

    fn push(&mut self, key: K, stamp: Stamp) {
        self.heap.push(Reverse(HeapEntry {
            frequency: stamp.frequency,
            seq: stamp.seq,
            key,
        }));
        self.maybe_compact();
    }

    fn maybe_compact(&mut self) {
        let limit = self
            .stamps
            .len()
            .saturating_mul(self.compaction_ratio)
            .max(MIN_COMPACTION_LEN);
        if self.heap.len() > limit {
            self.compact();
        }
    }
}

impl<K, S> fmt::Debug for FrequencyIndex<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyIndex")
            .field("len", &self.stamps.len())
            .field("heap_len", &self.heap.len())
            .field("next_seq", &self.next_seq)
            .field("compaction_ratio", &self.compaction_ratio)
            .finish()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Invariants hold after any sequence of operations.
        #[test]
        fn prop_invariants_always_hold(
            ops in prop::collection::vec((0u8..4, 0u32..32), 0..200)
        ) {
            let mut index: FrequencyIndex<u32> = FrequencyIndex::new().with_compaction_ratio(2);

            for (op, key) in ops {
                match op {
                    0 => { let _ = index.record_new_key(key); }
                    1 => { let _ = index.bump(&key); }
                    2 => { let _ = index.remove(&key); }
                    _ => { let _ = index.evict_min(); }
                }
                prop_assert!(index.check_invariants().is_ok());
            }
        }

        /// Draining the index yields non-decreasing (frequency, insertion) order.
        #[test]
        fn prop_drain_is_sorted_by_frequency(
            bumps in prop::collection::vec(0u32..16, 0..300)
        ) {
            let mut index: FrequencyIndex<u32> = FrequencyIndex::new();
            for key in 0..16 {
                index.record_new_key(key).unwrap();
            }
            for key in &bumps {
                index.bump(key).unwrap();
            }

            let mut expected = vec![1u64; 16];
            for key in &bumps {
                expected[*key as usize] += 1;
            }

            let mut last = 0;
            while let Ok((key, frequency)) = index.evict_min() {
                prop_assert_eq!(frequency, expected[key as usize]);
                prop_assert!(frequency >= last);
                last = frequency;
            }
            prop_assert!(index.is_empty());
        }
    }
}
