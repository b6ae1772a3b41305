//! Criterion micro-benchmarks for building, composing, and caching
//! pooling indices.

use criterion::{criterion_group, criterion_main, Criterion};
use strata_bench::reference_config;
use strata_core::PoolMethod;
use strata_pool::{IndexCache, PoolConfig, PoolIndex};

fn bench_build(c: &mut Criterion) {
    let cfg = reference_config();
    c.bench_function("index_for_window_56x56", |b| {
        b.iter(|| {
            let index = PoolIndex::for_window(56, 56, &cfg).unwrap();
            std::hint::black_box(index);
        });
    });
}

fn bench_compose(c: &mut Criterion) {
    let first = PoolIndex::for_window(112, 112, &reference_config()).unwrap();
    let second = PoolConfig::square(2, 2);

    for method in PoolMethod::ALL {
        c.bench_function(&format!("index_compose_{method}_112x112"), |b| {
            b.iter(|| {
                let index = first.compose(method, &second).unwrap();
                std::hint::black_box(index);
            });
        });
    }
}

fn bench_cache_hit(c: &mut Criterion) {
    let cfg = reference_config();
    let mut cache = IndexCache::default();
    cache.get_or_build(56, 56, PoolMethod::Max, &cfg).unwrap();

    c.bench_function("index_cache_hit", |b| {
        b.iter(|| {
            let index = cache.get_or_build(56, 56, PoolMethod::Max, &cfg).unwrap();
            std::hint::black_box(index.pooled_size());
        });
    });
}

criterion_group!(benches, bench_build, bench_compose, bench_cache_hit);
criterion_main!(benches);
