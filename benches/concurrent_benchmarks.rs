//! Concurrent Cache Benchmarks
//!
//! Compares the single-lock `LfuCache` against the sharded
//! `ConcurrentLfuCache` under reads, writes and a mixed workload, and
//! measures how the segment count affects throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lfu_cache::config::ConcurrentLfuCacheConfig;
use lfu_cache::{ConcurrentLfuCache, FixedSizeCache, LfuCache};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;
const THREADS: usize = 8;

fn single_lock() -> Arc<LfuCache<usize, usize>> {
    Arc::new(LfuCache::new(CACHE_SIZE).unwrap())
}

fn sharded(segments: usize) -> Arc<ConcurrentLfuCache<usize, usize>> {
    let config =
        ConcurrentLfuCacheConfig::new(NonZeroUsize::new(CACHE_SIZE).unwrap()).with_segments(segments);
    Arc::new(ConcurrentLfuCache::init(config).unwrap())
}

fn fill<C: FixedSizeCache<usize, usize>>(cache: &C) {
    for i in 0..CACHE_SIZE {
        cache.put(i, i);
    }
}

fn run_concurrent_reads<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: FixedSizeCache<usize, usize> + Send + Sync + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % CACHE_SIZE;
                black_box(cache.get(&key));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_concurrent_writes<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: FixedSizeCache<usize, usize> + Send + Sync + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = t * ops_per_thread + i;
                cache.put(key, i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_concurrent_mixed<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: FixedSizeCache<usize, usize> + Send + Sync + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % (CACHE_SIZE * 2);
                if i % 5 == 0 {
                    cache.put(key, key);
                } else {
                    black_box(cache.get(&key));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Reads");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    let single = single_lock();
    fill(&*single);
    group.bench_function("LfuCache", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&single), THREADS, OPS_PER_THREAD));
    });

    let shards = sharded(16);
    fill(&*shards);
    group.bench_function("ConcurrentLfuCache", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&shards), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

fn concurrent_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Writes");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("LfuCache", |b| {
        let cache = single_lock();
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.bench_function("ConcurrentLfuCache", |b| {
        let cache = sharded(16);
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("LfuCache", |b| {
        let cache = single_lock();
        fill(&*cache);
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.bench_function("ConcurrentLfuCache", |b| {
        let cache = sharded(16);
        fill(&*cache);
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

fn segment_count_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segment Count");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    for segments in [1, 4, 16, 64] {
        let cache = sharded(segments);
        fill(&*cache);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, _| {
            b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    concurrent_reads,
    concurrent_writes,
    concurrent_mixed,
    segment_count_comparison
);
criterion_main!(benches);
