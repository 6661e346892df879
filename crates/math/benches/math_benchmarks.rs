//! Benchmarks for carhart-math operations.
#![allow(missing_docs)]

use carhart_math::{
    ordinary_least_squares, percentile, sample_covariance, symmetric_eigenvalues,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05))
}

fn random_matrix(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f64>() * 0.02 - 0.01)
}

fn bench_percentile(c: &mut Criterion) {
    let mut group = c.benchmark_group("percentile");

    for size in [100, 1000, 10000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_array(size).to_vec();
            b.iter(|| percentile(black_box(&data), black_box(0.3)).unwrap());
        });
    }

    group.finish();
}

fn bench_ordinary_least_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("ols");

    // Time-series regressions: intercept plus four factors
    for n_periods in [252, 756, 2520] {
        group.throughput(Throughput::Elements(n_periods as u64));
        group.bench_with_input(BenchmarkId::new("periods", n_periods), &n_periods, |b, &n| {
            let y = random_array(n);
            let mut x = random_matrix(n, 5);
            x.column_mut(0).fill(1.0);
            b.iter(|| ordinary_least_squares(black_box(&y), black_box(&x)).unwrap());
        });
    }

    group.finish();
}

fn bench_sample_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_covariance");

    for (n_periods, n_vars) in [(252, 4), (2520, 4), (2520, 50)] {
        group.bench_with_input(
            BenchmarkId::new("shape", format!("{n_periods}x{n_vars}")),
            &(n_periods, n_vars),
            |b, &(n_periods, n_vars)| {
                let sample = random_matrix(n_periods, n_vars);
                b.iter(|| sample_covariance(black_box(&sample)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_symmetric_eigenvalues(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobi_eigenvalues");
    group.sample_size(30);

    for n_assets in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("assets", n_assets), &n_assets, |b, &n| {
            let sample = random_matrix(n * 3, n);
            let cov = sample_covariance(&sample).unwrap();
            b.iter(|| symmetric_eigenvalues(black_box(&cov)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_percentile,
    bench_ordinary_least_squares,
    bench_sample_covariance,
    bench_symmetric_eigenvalues,
);

criterion_main!(benches);
