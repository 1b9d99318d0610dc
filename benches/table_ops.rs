//! Benchmark suite for the primitive collections.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use primcoll::{AvlTreeMap, BigOpenHashMap, OpenHashMap};
use std::collections::{BTreeMap, HashMap};

const SIZES: [u64; 3] = [1_000, 10_000, 100_000];

// Spreads sequential numbers over the key space.
fn key(i: u64) -> u64 {
    i.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Benchmark insertion of new entries into an empty table, against the
/// standard `HashMap`.
fn insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in SIZES {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = OpenHashMap::new();
                for i in 0..size {
                    map.insert(black_box(key(i)), i);
                }
                map
            });
        });
        group.bench_with_input(BenchmarkId::new("big", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = BigOpenHashMap::builder(16).segment_shift(12).build();
                for i in 0..size {
                    map.insert(black_box(key(i)), i);
                }
                map
            });
        });
        group.bench_with_input(BenchmarkId::new("std", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = HashMap::new();
                for i in 0..size {
                    map.insert(black_box(key(i)), i);
                }
                map
            });
        });
    }
    group.finish();
}

/// Benchmark lookups of present and absent keys.
fn get_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for size in SIZES {
        let open: OpenHashMap<u64, u64> = (0..size).map(|i| (key(i), i)).collect();
        let hashed: HashMap<u64, u64> = (0..size).map(|i| (key(i), i)).collect();

        group.throughput(Throughput::Elements(2 * size));
        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, &size| {
            b.iter(|| {
                for i in 0..2 * size {
                    black_box(open.get(key(i)));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("std", size), &size, |b, &size| {
            b.iter(|| {
                for i in 0..2 * size {
                    black_box(hashed.get(&key(i)));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark removing every entry, which exercises the backward shift and the
/// shrinking of the table.
fn remove_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for size in SIZES {
        let open: OpenHashMap<u64, u64> = (0..size).map(|i| (key(i), i)).collect();

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, &size| {
            b.iter_batched(
                || open.clone(),
                |mut map| {
                    for i in 0..size {
                        black_box(map.remove(key(i)));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

/// Benchmark the sorted map against `BTreeMap`: inserts followed by an
/// in-order walk.
fn sorted_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted");

    for size in SIZES {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("avl", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = AvlTreeMap::new();
                for i in 0..size {
                    map.insert(black_box(key(i)), i);
                }
                map.values().sum::<u64>()
            });
        });
        group.bench_with_input(BenchmarkId::new("btree", size), &size, |b, &size| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for i in 0..size {
                    map.insert(black_box(key(i)), i);
                }
                map.values().sum::<u64>()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    insert_benchmark,
    get_benchmark,
    remove_benchmark,
    sorted_benchmark
);
criterion_main!(benches);
