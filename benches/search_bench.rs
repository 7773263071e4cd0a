use std::hint::black_box;

use bizsearch::{CompanyCatalog, MatchConfig, RankedMatcher};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod common;
use common::{compressed_catalog, in_memory_catalog};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

/// End-to-end ranked search over growing catalogs.
fn bench_ranked_search(c: &mut Criterion) {
    let rt = runtime();
    let matcher = RankedMatcher::new(MatchConfig::default()).expect("default config is valid");
    let mut group = c.benchmark_group("ranked_search");

    for size in [1_000usize, 10_000, 50_000] {
        let catalog = in_memory_catalog(size);
        group.throughput(Throughput::Elements(1));
        for query in ["acme", "globex holdings", "initek", "software"] {
            group.bench_with_input(
                BenchmarkId::new(query.replace(' ', "_"), size),
                &query,
                |b, query| {
                    b.iter(|| {
                        rt.block_on(matcher.search(black_box(query), &catalog))
                            .expect("search should succeed")
                    })
                },
            );
        }
    }
    group.finish();
}

/// Individual lookup primitives, to see which tier dominates a search.
fn bench_lookups(c: &mut Criterion) {
    let rt = runtime();
    let catalog = in_memory_catalog(10_000);
    let mut group = c.benchmark_group("lookups");

    group.bench_function("exact", |b| {
        b.iter(|| rt.block_on(catalog.exact_match(black_box("acme corp 0"))))
    });
    group.bench_function("prefix", |b| {
        b.iter(|| rt.block_on(catalog.prefix_match(black_box("acme"))))
    });
    group.bench_function("substring", |b| {
        b.iter(|| rt.block_on(catalog.substring_match(black_box("holdings"))))
    });
    group.bench_function("similarity", |b| {
        b.iter(|| rt.block_on(catalog.similarity_match(black_box("globx"), 0.3)))
    });
    group.bench_function("full_text", |b| {
        b.iter(|| rt.block_on(catalog.full_text_match(black_box("software"))))
    });
    group.finish();
}

/// Snapshot rebuild cost: storage scan, decode and re-indexing.
fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    group.sample_size(10);

    for size in [1_000usize, 10_000] {
        let plain = in_memory_catalog(size);
        let zstd = compressed_catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("none", size), |b| {
            b.iter(|| plain.refresh().expect("refresh should succeed"))
        });
        group.bench_function(BenchmarkId::new("zstd", size), |b| {
            b.iter(|| zstd.refresh().expect("refresh should succeed"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ranked_search, bench_lookups, bench_refresh);
criterion_main!(benches);
