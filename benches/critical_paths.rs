use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use revenue_attest::core::MerkleTree;
use revenue_attest::revenue::PeriodAggregator;
use revenue_attest::test_utils::{numbered_leaves, sample_records, TestHarness};
use chrono::Utc;
use tokio::runtime::Runtime;

fn bench_build_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");
    for size in [12usize, 120, 1_200] {
        let leaves = numbered_leaves(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &leaves, |b, leaves| {
            b.iter(|| MerkleTree::new(black_box(leaves)).unwrap());
        });
    }
    group.finish();
}

fn bench_proofs(c: &mut Criterion) {
    let leaves = numbered_leaves(1_200);
    let tree = MerkleTree::new(&leaves).unwrap();
    let proof = tree.generate_proof(777).unwrap();

    c.bench_function("generate_proof", |b| {
        b.iter(|| tree.generate_proof(black_box(777)).unwrap());
    });
    c.bench_function("verify_proof", |b| {
        b.iter(|| MerkleTree::verify_proof(black_box(&leaves[777]), black_box(&proof), tree.root_hash()));
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let records: Vec<_> = (0..100).flat_map(|_| sample_records()).collect();
    let aggregator = PeriodAggregator::default();
    let now = Utc::now();
    c.bench_function("aggregate_300_rows", |b| {
        b.iter(|| aggregator.aggregate(black_box(&records), now).unwrap());
    });
}

fn bench_submit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let harness = TestHarness::new(sample_records());
    c.bench_function("pipeline_submit", |b| {
        b.to_async(&rt).iter(|| async {
            harness.pipeline.submit(black_box("biz-bench"), "2025-Q1").await.unwrap();
        });
    });
}

criterion_group!(benches, bench_build_tree, bench_proofs, bench_aggregate, bench_submit);
criterion_main!(benches);
