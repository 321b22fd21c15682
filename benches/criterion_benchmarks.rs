use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lfu_cache::{FrequencyIndex, LfuCache, LfuCacheConfig};
use std::num::NonZeroUsize;

fn make_lfu<K: std::hash::Hash + Eq + Clone, V>(cap: usize, compaction_ratio: usize) -> LfuCache<K, V> {
    let config = LfuCacheConfig::new(NonZeroUsize::new(cap).unwrap())
        .with_compaction_ratio(compaction_ratio);
    LfuCache::init(config)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    const CACHE_SIZE: usize = 1000;
    let mut group = c.benchmark_group("Cache Operations");

    {
        let cache = make_lfu(CACHE_SIZE, 4);
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }

        group.bench_function("LFU get hit", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i % CACHE_SIZE)));
                }
            });
        });

        group.bench_function("LFU get miss", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i + CACHE_SIZE)));
                }
            });
        });

        group.bench_function("LFU put existing", |b| {
            b.iter(|| {
                for i in 0..100 {
                    cache.put(black_box(i % CACHE_SIZE), i);
                }
            });
        });
    }

    {
        let cache = make_lfu(CACHE_SIZE, 4);
        let mut next = 0usize;
        group.bench_function("LFU put with eviction", |b| {
            b.iter(|| {
                for _ in 0..100 {
                    cache.put(black_box(next), next);
                    next += 1;
                }
            });
        });
    }

    {
        let cache = make_lfu(CACHE_SIZE, 4);
        let mut step = 0usize;
        group.bench_function("LFU mixed 80/20", |b| {
            b.iter(|| {
                for _ in 0..100 {
                    step = step.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let key = if step % 5 == 0 { step % 10_000 } else { step % 200 };
                    if cache.get(&key).is_none() {
                        cache.put(key, key);
                    }
                }
            });
        });
    }

    group.finish();
}

/// Hit cost depends on how often the heap is rebuilt.
pub fn compaction_benchmark(c: &mut Criterion) {
    const CACHE_SIZE: usize = 1000;
    let mut group = c.benchmark_group("Compaction Ratio");

    for ratio in [2usize, 4, 16] {
        let cache = make_lfu(CACHE_SIZE, ratio);
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, _| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i * 7 % CACHE_SIZE)));
                }
            });
        });
    }

    group.finish();
}

pub fn frequency_index_benchmark(c: &mut Criterion) {
    const KEYS: u64 = 1000;
    let mut group = c.benchmark_group("Frequency Index");

    group.bench_function("record + evict_min", |b| {
        b.iter(|| {
            let mut index = FrequencyIndex::with_capacity(KEYS as usize);
            for key in 0..KEYS {
                index.record_new_key(key).unwrap();
            }
            for key in (0..KEYS).step_by(3) {
                index.bump(&key).unwrap();
            }
            while let Ok(entry) = index.evict_min() {
                black_box(entry);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    criterion_benchmark,
    compaction_benchmark,
    frequency_index_benchmark
);
criterion_main!(benches);
