use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use indexmap::IndexMap;
use loadenv_client::CachedSecrets;
use loadenv_client::cache::{CacheConfig, CacheKey, SecretSelector, TtlCache};
use loadenv_core::SecretValue;

fn key(i: usize) -> CacheKey {
    CacheKey::derive("proj", "prod", "/", SecretSelector::Name(format!("SECRET_{}", i)))
}

/// Crea un snapshot de prueba con N secrets
fn create_snapshot(num_secrets: usize) -> CachedSecrets {
    let secrets: IndexMap<String, SecretValue> = (0..num_secrets)
        .map(|i| (format!("SECRET_{}", i), SecretValue::new(format!("value-{}", i))))
        .collect();
    CachedSecrets::All(secrets)
}

/// Benchmark: Cache get (hit)
fn bench_cache_get_hit(c: &mut Criterion) {
    let cache = TtlCache::new(CacheConfig::default());
    let key = key(0);
    cache.insert(key.clone(), CachedSecrets::Single(SecretValue::new("value")));

    c.bench_function("cache_get_hit", |b| {
        b.iter(|| std::hint::black_box(cache.get(&key)));
    });
}

/// Benchmark: Cache get (miss)
fn bench_cache_get_miss(c: &mut Criterion) {
    let cache: TtlCache<CacheKey, CachedSecrets> = TtlCache::new(CacheConfig::default());
    let key = key(0);

    c.bench_function("cache_get_miss", |b| {
        b.iter(|| std::hint::black_box(cache.get(&key)));
    });
}

/// Benchmark: Cache insert at capacity (evicts on every insert)
fn bench_cache_insert_evicting(c: &mut Criterion) {
    let cache = TtlCache::new(CacheConfig::default());
    let mut counter = 0usize;

    c.bench_function("cache_insert_evicting", |b| {
        b.iter(|| {
            counter += 1;
            cache.insert(key(counter), CachedSecrets::Single(SecretValue::new("v")));
        });
    });
}

/// Benchmark: Snapshot hits by size
fn bench_snapshot_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_get");

    for size in [10, 100, 500] {
        let cache = TtlCache::new(CacheConfig::default());
        let key = CacheKey::derive("proj", "prod", "/", SecretSelector::All);
        cache.insert(key.clone(), create_snapshot(size));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| std::hint::black_box(cache.get(&key)));
        });
    }

    group.finish();
}

/// Benchmark: Scope invalidation over a full cache
fn bench_invalidate_scope(c: &mut Criterion) {
    let cache = TtlCache::new(CacheConfig::default());

    c.bench_function("invalidate_scope_full_cache", |b| {
        b.iter(|| {
            for i in 0..100 {
                cache.insert(key(i), CachedSecrets::Single(SecretValue::new("v")));
            }
            std::hint::black_box(cache.invalidate_scope("proj", "prod", "/"))
        });
    });
}

criterion_group!(
    benches,
    bench_cache_get_hit,
    bench_cache_get_miss,
    bench_cache_insert_evicting,
    bench_snapshot_sizes,
    bench_invalidate_scope
);
criterion_main!(benches);
