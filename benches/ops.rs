//! Micro-operation benchmarks for the tree cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for set, get-hit, and a mixed
//! random-path workload, at depth 1 and depth 3.

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use treecache::{TreeCache, TreeOps};

const KEYS: usize = 4_096;
const OPS: u64 = 10_000;
const TTL: Duration = Duration::from_secs(600);

fn keyspace() -> Vec<String> {
    (0..KEYS).map(|i| format!("key_{i:05}")).collect()
}

// ============================================================================
// Set latency (ns/op)
// ============================================================================

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_ns");
    group.throughput(Throughput::Elements(OPS));
    let keys = keyspace();
    let payload = vec![0xAB_u8; 128];

    group.bench_function("depth_1", |b| {
        let cache = TreeCache::new();
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            for _ in 0..OPS {
                let key = keys[rng.gen_range(0..KEYS)].as_str();
                cache.set(black_box(&[key]), TTL, &payload).unwrap();
            }
        })
    });

    group.bench_function("depth_3", |b| {
        let cache = TreeCache::new();
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            for _ in 0..OPS {
                let a = keys[rng.gen_range(0..64)].as_str();
                let mid = keys[rng.gen_range(0..64)].as_str();
                let leaf = keys[rng.gen_range(0..KEYS)].as_str();
                cache.set(black_box(&[a, mid, leaf]), TTL, &payload).unwrap();
            }
        })
    });

    group.finish();
}

// ============================================================================
// Get-hit latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));
    let keys = keyspace();
    let payload = vec![0xCD_u8; 128];

    group.bench_function("depth_1", |b| {
        let cache = TreeCache::new();
        for key in &keys {
            cache.set(&[key.as_str()], TTL, &payload).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            for _ in 0..OPS {
                let key = keys[rng.gen_range(0..KEYS)].as_str();
                black_box(cache.get(black_box(&[key])));
            }
        })
    });

    group.bench_function("depth_3_read", |b| {
        let cache = TreeCache::new();
        for key in keys.iter().take(512) {
            cache.set(&["a", "b", key.as_str()], TTL, &payload).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            for _ in 0..OPS {
                let key = keys[rng.gen_range(0..512)].as_str();
                if let Some(node) = cache.get(black_box(&["a", "b", key])) {
                    black_box(node.read());
                }
            }
        })
    });

    group.finish();
}

// ============================================================================
// Mixed random workload (reads and writes interleaved)
// ============================================================================

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_ns");
    group.throughput(Throughput::Elements(OPS));
    let keys = keyspace();
    let payload = vec![0xEF_u8; 128];

    group.bench_function("read_heavy_90_10", |b| {
        let cache = TreeCache::new();
        for key in &keys {
            cache.set(&[key.as_str()], TTL, &payload).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(23);
        b.iter(|| {
            for _ in 0..OPS {
                let key = keys[rng.gen_range(0..KEYS)].as_str();
                if rng.gen_range(0..10) == 0 {
                    cache.set(black_box(&[key]), TTL, &payload).unwrap();
                } else {
                    black_box(cache.get(black_box(&[key])));
                }
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get_hit, bench_mixed);
criterion_main!(benches);
