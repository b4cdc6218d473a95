use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use titanic_search::prelude::*;

fn create_data(n_rows: usize, n_features: usize) -> DataMatrix {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    // Label in column 0, survival driven by the first feature plus noise
    let rows: Vec<Vec<f64>> = (0..n_rows)
        .map(|_| {
            let features: Vec<f64> = (0..n_features).map(|_| rng.gen::<f64>() * 10.0).collect();
            let label = if features[0] + rng.gen::<f64>() * 2.0 > 6.0 { 1.0 } else { 0.0 };
            std::iter::once(label).chain(features).collect()
        })
        .collect();

    DataMatrix::from_rows(&rows, Some(0), (1..=n_features).collect()).unwrap()
}

fn bench_combinatorial(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinatorial");
    group.sample_size(10);

    for n_rows in [100, 891].iter() {
        let data = create_data(*n_rows, 10);
        let config = SearchConfig::default()
            .with_specific(false)
            .with_combination_sizes(vec![1, 2])
            .with_transform_dimensions(vec![]);
        let orchestrator = Orchestrator::new(config).unwrap();

        group.bench_with_input(BenchmarkId::new("sizes_1_2", n_rows), &data, |b, data| {
            b.iter(|| orchestrator.build_combinatorial(black_box(data)))
        });
    }

    group.finish();
}

fn bench_transformed(c: &mut Criterion) {
    let mut group = c.benchmark_group("transformed");
    group.sample_size(10);

    let data = create_data(891, 6);
    for dimension in TransformCatalog::DIMENSIONS {
        let config = SearchConfig::default()
            .with_models(vec![ModelKind::Linreg])
            .with_specific(false)
            .with_combination_sizes(vec![])
            .with_transform_dimensions(vec![dimension]);
        let orchestrator = Orchestrator::new(config).unwrap();

        group.bench_with_input(BenchmarkId::new("linreg", dimension), &data, |b, data| {
            b.iter(|| orchestrator.build_transformed(black_box(data)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_combinatorial, bench_transformed);
criterion_main!(benches);
