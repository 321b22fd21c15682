//! Stress Tests for Shared LFU Caches
//!
//! These tests verify thread safety and bookkeeping under high contention:
//! the size bound holds, store and frequency index stay in lockstep, and no
//! hit or miss is lost.

use lfu_cache::LfuCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn xorshift(seed: u64) -> impl FnMut() -> u64 {
    let mut state = seed | 1;
    move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    }
}

#[test]
fn stress_lfu_high_contention() {
    let cache: Arc<LfuCache<u64, u64>> = Arc::new(LfuCache::new(100).unwrap());
    let gets = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let gets = Arc::clone(&gets);
            thread::spawn(move || {
                let mut rng = xorshift(t as u64 + 1);
                for _ in 0..OPS_PER_THREAD {
                    let r = rng();
                    let key = r % 500;
                    if r % 3 == 0 {
                        cache.put(key, r);
                    } else {
                        let _ = cache.get(&key);
                        gets.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= 100);
    assert_eq!(
        cache.hit_count() + cache.miss_count(),
        gets.load(Ordering::Relaxed)
    );
    cache.check_invariants().unwrap();
}

#[test]
fn stress_capacity_never_exceeded_while_running() {
    let cache: Arc<LfuCache<usize, usize>> = Arc::new(LfuCache::new(32).unwrap());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    cache.put(t * OPS_PER_THREAD + i, i);
                }
            })
        })
        .collect();

    let observer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for _ in 0..1_000 {
                assert!(cache.len() <= 32);
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    observer.join().unwrap();

    assert_eq!(cache.len(), 32);
    cache.check_invariants().unwrap();
}

#[test]
fn stress_hot_keys_survive_cold_churn() {
    let cache: Arc<LfuCache<u64, u64>> = Arc::new(LfuCache::new(64).unwrap());
    for hot in 0..8 {
        cache.put(hot, hot);
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD as u64 {
                    assert_eq!(cache.get(&(i % 8)), Some(i % 8));
                }
            })
        })
        .collect();

    for handle in readers {
        handle.join().unwrap();
    }

    // Cold keys only ever reach frequency 1, so they evict each other.
    let churn: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD as u64 {
                    cache.put(1_000 + t * OPS_PER_THREAD as u64 + i, i);
                }
            })
        })
        .collect();

    for handle in churn {
        handle.join().unwrap();
    }

    for hot in 0..8 {
        assert!(cache.contains_key(&hot), "hot key {} evicted", hot);
        assert_eq!(cache.frequency(&hot), Some(1 + 4 * OPS_PER_THREAD as u64 / 8));
    }
    cache.check_invariants().unwrap();
}

#[test]
fn stress_same_key_updates() {
    let cache: Arc<LfuCache<&'static str, usize>> = Arc::new(LfuCache::new(4).unwrap());
    cache.put("shared", 0);

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..1_000 {
                    cache.put("shared", t * 1_000 + i);
                    assert!(cache.get(&"shared").is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.frequency(&"shared"), Some(1 + NUM_THREADS as u64 * 1_000));
    assert_eq!(cache.lfu_metrics().core.updates, NUM_THREADS as u64 * 1_000);
    cache.check_invariants().unwrap();
}

#[cfg(feature = "concurrent")]
mod sharded {
    use super::*;
    use lfu_cache::config::ConcurrentLfuCacheConfig;
    use lfu_cache::{CacheMetrics, ConcurrentLfuCache};
    use std::num::NonZeroUsize;

    fn lfu_config(capacity: usize, segments: usize) -> ConcurrentLfuCacheConfig {
        ConcurrentLfuCacheConfig::new(NonZeroUsize::new(capacity).unwrap()).with_segments(segments)
    }

    #[test]
    fn stress_sharded_high_contention() {
        let cache: Arc<ConcurrentLfuCache<u64, u64>> =
            Arc::new(ConcurrentLfuCache::init(lfu_config(100, 8)).unwrap());
        let gets = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let gets = Arc::clone(&gets);
                thread::spawn(move || {
                    let mut rng = xorshift(t as u64 + 99);
                    for _ in 0..OPS_PER_THREAD {
                        let r = rng();
                        let key = r % 1_000;
                        if r % 2 == 0 {
                            cache.put(key, r);
                        } else {
                            let _ = cache.get(&key);
                            gets.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= cache.capacity());
        assert_eq!(
            cache.hit_count() + cache.miss_count(),
            gets.load(Ordering::Relaxed)
        );
        let metrics = cache.metrics();
        assert_eq!(
            metrics["requests"] as u64,
            gets.load(Ordering::Relaxed)
        );
        cache.check_invariants().unwrap();
    }

    #[test]
    fn stress_segment_counts() {
        for segments in [1, 2, 4, 8, 16, 32] {
            let cache: Arc<ConcurrentLfuCache<usize, usize>> =
                Arc::new(ConcurrentLfuCache::init(lfu_config(100, segments)).unwrap());
            assert_eq!(cache.segment_capacities().iter().sum::<usize>(), 100);

            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..1_000 {
                            cache.put(t * 1_000 + i, i);
                            let _ = cache.get(&(t * 1_000 + i / 2));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert!(cache.len() <= 100, "segments = {}", segments);
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn stress_single_item_cache() {
        let cache: Arc<ConcurrentLfuCache<usize, usize>> =
            Arc::new(ConcurrentLfuCache::init(lfu_config(1, 1)).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..1_000 {
                        cache.put(t * 1_000 + i, i);
                        let _ = cache.get(&(t * 1_000 + i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }
}
