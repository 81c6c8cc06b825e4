use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use refinery_bio::alignment::merge_intervals;
use refinery_bio::clustering::{minimizers, MinimizerClusterer};
use std::hint::black_box;

const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Families of related proteins: each family mutates one random parent
fn create_test_proteins(families: usize, per_family: usize) -> Vec<(String, String)> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut proteins = Vec::with_capacity(families * per_family);

    for f in 0..families {
        let length = rng.gen_range(150..400);
        let parent: Vec<u8> = (0..length)
            .map(|_| AMINO_ACIDS[rng.gen_range(0..AMINO_ACIDS.len())])
            .collect();

        for m in 0..per_family {
            let mut child = parent.clone();
            for _ in 0..(length / 100) {
                let pos = rng.gen_range(0..child.len());
                child[pos] = AMINO_ACIDS[rng.gen_range(0..AMINO_ACIDS.len())];
            }
            proteins.push((
                format!("fam{}-{}", f, m),
                String::from_utf8_lossy(&child).into_owned(),
            ));
        }
    }
    proteins
}

fn bench_minimizers(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimizers");
    let proteins = create_test_proteins(1, 1);
    let protein = proteins[0].1.as_bytes();

    group.throughput(Throughput::Bytes(protein.len() as u64));
    for k in [3usize, 5, 8] {
        group.bench_with_input(BenchmarkId::new("k", k), &k, |b, &k| {
            b.iter(|| minimizers(black_box(protein), k, 5));
        });
    }
    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");
    group.sample_size(20);

    for families in [10usize, 100, 500] {
        let proteins = create_test_proteins(families, 5);
        let clusterer = MinimizerClusterer::default();
        group.throughput(Throughput::Elements(proteins.len() as u64));

        group.bench_with_input(BenchmarkId::new("cluster", families), &proteins, |b, p| {
            b.iter(|| clusterer.cluster(black_box(p)));
        });

        let clustering = clusterer.cluster(&proteins);
        group.bench_with_input(
            BenchmarkId::new("representative_similarity", families),
            &clustering,
            |b, c| {
                b.iter(|| clusterer.representative_similarity(black_box(c)));
            },
        );
    }
    group.finish();
}

fn bench_interval_merge(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let intervals: Vec<(i64, i64)> = (0..1000)
        .map(|_| {
            let start = rng.gen_range(1..5000);
            (start, start + rng.gen_range(10..300))
        })
        .collect();

    c.bench_function("merge_intervals_1000", |b| {
        b.iter(|| merge_intervals(black_box(&intervals)));
    });
}

criterion_group!(benches, bench_minimizers, bench_clustering, bench_interval_merge);
criterion_main!(benches);
