//! LFU Cache Walkthrough
//!
//! Replays a short put/get sequence against a two-slot cache and prints what
//! gets evicted at each step.
//!
//! Run with: RUST_LOG=lfu_cache=trace cargo run --example lfu_demo

extern crate lfu_cache;

use lfu_cache::{CacheMetrics, LfuCache, LfuError};
use tracing_subscriber::EnvFilter;

enum Step {
    Put(&'static str, i32),
    Get(&'static str),
}

fn show(cache: &LfuCache<&'static str, i32>, keys: &[&'static str]) -> String {
    keys.iter()
        .filter_map(|k| cache.frequency(k).map(|f| format!("{}(f={})", k, f)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), LfuError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let keys = ["a", "b", "c", "d", "e", "f"];
    let steps = [
        Step::Put("a", 1),
        Step::Put("b", 2),
        Step::Get("a"),
        Step::Put("c", 3),
        Step::Put("d", 4),
        Step::Put("e", 5),
        Step::Get("e"),
        Step::Put("f", 6),
    ];

    let cache = LfuCache::new(2)?;
    println!("LFU cache with capacity {}", cache.capacity());
    println!("==============================");

    for step in steps {
        match step {
            Step::Put(key, value) => {
                let victim = if cache.len() == cache.capacity() && !cache.contains_key(&key) {
                    cache.peek_eviction_candidate()
                } else {
                    None
                };
                cache.put(key, value);
                match victim {
                    Some((evicted, frequency)) => println!(
                        "put {}={:<3} evicts {}(f={})   -> {}",
                        key,
                        value,
                        evicted,
                        frequency,
                        show(&cache, &keys)
                    ),
                    None => println!("put {}={:<3}                -> {}", key, value, show(&cache, &keys)),
                }
            }
            Step::Get(key) => {
                let value = cache.get(&key);
                println!("get {}   = {:<14?}-> {}", key, value, show(&cache, &keys));
            }
        }
    }

    println!();
    println!("get(\"f\") = {:?}", cache.get(&"f"));
    println!();
    println!("{} metrics:", cache.algorithm_name());
    for (name, value) in cache.metrics() {
        println!("  {:<28} {}", name, value);
    }

    cache.check_invariants()
}
