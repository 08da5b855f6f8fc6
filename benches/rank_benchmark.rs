use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use webrank::graph::GraphStore;
use webrank::rank::compute_local;
use webrank_algorithms::{aggregate, initial_ranks, top_k, NodeId, PageRankConfig, TOP_K};

/// Random graph with out-degrees in `0..16`
fn random_graph(nodes: u32) -> GraphStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut adjacency = Vec::with_capacity(nodes as usize);
    for source in 0..nodes {
        let degree: usize = rng.gen_range(0..16);
        let targets: Vec<NodeId> = (0..degree).map(|_| rng.gen_range(0..nodes)).collect();
        adjacency.push((source, targets));
    }
    GraphStore::from_adjacency(adjacency).unwrap()
}

/// Benchmark one local aggregation pass over the whole graph
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1_000u32, 10_000, 100_000].iter() {
        let partition = random_graph(*size).to_partition();
        let ranks = initial_ranks(*size as usize);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(aggregate(&ranks, &partition, 0.85)));
        });
    }
    group.finish();
}

/// Benchmark a full in-process run for varying worker counts
fn bench_compute_local(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_local");
    group.sample_size(10);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = random_graph(20_000);

    for workers in [1usize, 2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            b.iter(|| {
                runtime
                    .block_on(compute_local(store.clone(), workers, PageRankConfig::default()))
                    .unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark top-10 selection
fn bench_top_k(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let ranks: Vec<f64> = (0..100_000).map(|_| rng.gen::<f64>()).collect();

    c.bench_function("top_k_100000", |b| {
        b.iter(|| criterion::black_box(top_k(&ranks, TOP_K)));
    });
}

criterion_group!(benches, bench_aggregate, bench_compute_local, bench_top_k);
criterion_main!(benches);
