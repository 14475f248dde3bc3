//! Criterion benchmarks for metadata-cluster.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;

use metadata_cluster::engine::{clustroid, ClusterConfig, ClusteringContext, KSearch};
use metadata_cluster::metric::DistanceMetric;
use metadata_cluster::types::{FeatureVector, FeatureVectorBuilder};

/// Random sparse vectors over a shared pool of `dims` feature names.
fn make_vectors(count: usize, dims: usize) -> Vec<FeatureVector> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let mut builder = FeatureVectorBuilder::new(format!("item_{}", i));
            for d in 0..dims {
                if rng.gen_bool(0.7) {
                    let value: f64 = rng.gen_range(0.0..100.0);
                    builder = builder.text_feature(
                        format!("field_{}", d),
                        value,
                        format!("value {:.3}", value),
                    );
                }
            }
            builder.build()
        })
        .collect()
}

fn bench_metrics(c: &mut Criterion) {
    let vectors = make_vectors(2, 64);
    let (a, b) = (&vectors[0], &vectors[1]);

    for metric in DistanceMetric::ALL {
        c.bench_function(&format!("{}_distance_64dim", metric), |bench| {
            bench.iter(|| metric.distance(a, b))
        });
    }
}

fn bench_clustroid_cached(c: &mut Criterion) {
    let vectors = make_vectors(200, 16);
    let members: Vec<usize> = (0..vectors.len()).collect();

    c.bench_function("clustroid_200_cached", |b| {
        let mut ctx = ClusteringContext::new(DistanceMetric::Jaccard);
        b.iter(|| clustroid(&mut ctx, &vectors, &members))
    });

    c.bench_function("clustroid_200_cold", |b| {
        b.iter(|| {
            let mut ctx = ClusteringContext::new(DistanceMetric::Jaccard);
            clustroid(&mut ctx, &vectors, &members)
        })
    });
}

fn bench_best_of_euclidean(c: &mut Criterion) {
    let vectors = make_vectors(1_000, 8);
    let config = ClusterConfig::default()
        .with_seed(1)
        .with_restarts(15)
        .with_iterations(30);
    let search = KSearch::new(&vectors, config).unwrap();

    c.bench_function("best_of_k4_1k_euclidean", |b| {
        b.iter(|| search.best_of(4).unwrap())
    });
}

fn bench_best_of_sequential(c: &mut Criterion) {
    let vectors = make_vectors(1_000, 8);
    let config = ClusterConfig::default()
        .with_seed(1)
        .with_restarts(15)
        .with_iterations(30)
        .with_parallel(false);
    let search = KSearch::new(&vectors, config).unwrap();

    c.bench_function("best_of_k4_1k_sequential", |b| {
        b.iter(|| search.best_of(4).unwrap())
    });
}

fn bench_sweep_edit(c: &mut Criterion) {
    let vectors = make_vectors(150, 6);
    let config = ClusterConfig::default()
        .with_metric(DistanceMetric::Edit)
        .with_seed(1)
        .with_restarts(3)
        .with_iterations(10)
        .with_early_stop(true);
    let search = KSearch::new(&vectors, config).unwrap();

    c.bench_function("sweep_edit_150", |b| b.iter(|| search.sweep().unwrap()));
}

criterion_group!(
    benches,
    bench_metrics,
    bench_clustroid_cached,
    bench_best_of_euclidean,
    bench_best_of_sequential,
    bench_sweep_edit,
);
criterion_main!(benches);
