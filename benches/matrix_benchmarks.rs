//! Performance benchmarks for contingency accumulation and merging
//! Measures map-side accumulation, wire encoding and reduce-side merges

use catcorr::config::JobConfig;
use catcorr::mapreduce::pure::merge_partials;
use catcorr::mapreduce::{accumulate, AttributePair, JobPlan};
use catcorr::matrix::{parallel_merge, ContingencyMatrix};
use catcorr::schema::FeatureSchema;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::path::PathBuf;
use std::sync::Arc;

const SCHEMA: &str = r#"{
    "fields": [
        {"name": "a", "ordinal": 0, "cardinality": ["a0", "a1", "a2", "a3"]},
        {"name": "b", "ordinal": 1, "cardinality": ["b0", "b1", "b2"]},
        {"name": "c", "ordinal": 2, "cardinality": ["c0", "c1", "c2", "c3", "c4"]},
        {"name": "d", "ordinal": 3, "cardinality": ["d0", "d1"]}
    ]
}"#;

fn plan() -> Arc<JobPlan> {
    let schema = FeatureSchema::from_json(SCHEMA).unwrap();
    let config = JobConfig {
        schema_path: Some(PathBuf::from("schema.json")),
        source_attributes: vec![0, 1],
        dest_attributes: vec![2, 3],
        ..JobConfig::default()
    };
    Arc::new(JobPlan::resolve(&config, &schema).unwrap())
}

fn records(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("a{},b{},c{},d{}", i % 4, (i / 3) % 3, (i * 7) % 5, i % 2))
        .collect()
}

fn random_matrix(rows: usize, cols: usize, seed: u64) -> ContingencyMatrix {
    let grid: Vec<Vec<u64>> = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| (seed * 31 + r as u64 * 17 + c as u64 * 13) % 97)
                .collect()
        })
        .collect();
    ContingencyMatrix::from_rows(&grid).unwrap()
}

/// Benchmark map-side accumulation
fn bench_accumulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulation");
    let plan = plan();

    for size in [1_000, 10_000, 100_000] {
        let input = records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let (emitted, counters) =
                    accumulate(plan.clone(), input.iter().map(String::as_str)).unwrap();
                black_box((emitted, counters))
            });
        });
    }
    group.finish();
}

/// Benchmark wire encoding of one matrix
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    for (rows, cols) in [(2, 2), (10, 10), (50, 50)] {
        let matrix = random_matrix(rows, cols, 7);
        let wire = matrix.serialize();
        group.bench_function(format!("serialize_{}x{}", rows, cols), |b| {
            b.iter(|| black_box(matrix.serialize()))
        });
        group.bench_function(format!("deserialize_{}x{}", rows, cols), |b| {
            b.iter(|| black_box(ContingencyMatrix::deserialize(&wire).unwrap()))
        });
    }
    group.finish();
}

/// Compare sequential and parallel merges of many partials
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let key = AttributePair::new(0, 2);

    for count in [16, 256, 4096] {
        let partials: Vec<ContingencyMatrix> =
            (0..count).map(|seed| random_matrix(4, 5, seed as u64)).collect();
        let wire: Vec<String> = partials.iter().map(|m| m.serialize()).collect();

        group.bench_with_input(BenchmarkId::new("sequential", count), &partials, |b, partials| {
            b.iter(|| {
                let merged = partials
                    .iter()
                    .try_fold(ContingencyMatrix::new(4, 5), |acc, p| acc.merged(p))
                    .unwrap();
                black_box(merged)
            });
        });
        group.bench_with_input(BenchmarkId::new("parallel", count), &partials, |b, partials| {
            b.iter(|| black_box(parallel_merge(4, 5, partials.clone()).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("from_wire", count), &wire, |b, wire| {
            b.iter(|| black_box(merge_partials(key, 4, 5, wire).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_accumulation, bench_codec, bench_merge);
criterion_main!(benches);
