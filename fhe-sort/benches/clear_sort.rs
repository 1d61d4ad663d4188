use criterion::{Criterion, criterion_group, criterion_main};
use fhe_core::{FheEngine, PlainEngine};
use fhe_sort::{
    ComparisonNetworkSorter, NetworkParams, PermutationParams, RankPermutationSorter, permutation,
};

/// Sorting-circuit evaluation over the exact engine, isolating the SIMD
/// plumbing (rotations, masking, rotate-sums) from the polynomial math.
fn bench_network(c: &mut Criterion) {
    let n = 16;
    let values: Vec<f64> = (0..n).map(|i| ((n - i) as f64) / (n as f64 + 1.0)).collect();
    let engine = PlainEngine::exact(n);
    let params = NetworkParams::select(0.05).unwrap();
    let sorter = ComparisonNetworkSorter::new(&engine, params);
    let input = engine.encrypt(&values, 0);

    c.bench_function("network_sort_16", |b| {
        b.iter(|| sorter.sort(&input).unwrap())
    });
}

fn bench_permutation(c: &mut Criterion) {
    let n = 8;
    let values: Vec<f64> = (0..n).map(|i| ((n - i) as f64) / (n as f64 + 1.0)).collect();
    let engine = PlainEngine::exact(n * n);
    let params = PermutationParams::select(0.05, n, true).unwrap();
    let sorter = RankPermutationSorter::new(&engine, params);
    let expanded = engine.encrypt(&permutation::expanded_layout(&values), 0);
    let tiled = engine.encrypt(&permutation::tiled_layout(&values), 0);

    c.bench_function("permutation_sort_8", |b| {
        b.iter(|| sorter.sort(&expanded, &tiled).unwrap())
    });
}

criterion_group!(benches, bench_network, bench_permutation);
criterion_main!(benches);
