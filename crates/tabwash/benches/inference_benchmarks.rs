//! Type inference and outlier ranking benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabwash::data::{Column, Dataset, SemanticType, Value};
use tabwash::outlier::EnsembleDetector;
use tabwash::{OutlierAlgorithm, OutlierDetector, TypeInferencer};

/// A dataset of `rows` rows with integer, float, date-like and text columns.
fn generate_dataset(rows: usize) -> Dataset {
    let ids = (0..rows as i64).map(Value::Integer).collect();
    let values = (0..rows)
        .map(|r| Value::Float((r as f64 * 0.37).sin() * 10.0 + 0.5))
        .collect();
    let days = (0..rows)
        .map(|r| Value::from(format!("2023-{:02}-{:02}", (r % 12) + 1, (r % 28) + 1)))
        .collect();
    let labels = (0..rows)
        .map(|r| Value::from(format!("label_{}", r % 37)))
        .collect();

    Dataset::new(vec![
        Column::new("id", ids, SemanticType::Integer),
        Column::new("value", values, SemanticType::Float),
        Column::new("day", days, SemanticType::Object),
        Column::new("label", labels, SemanticType::Object),
    ])
    .unwrap()
}

/// Benchmark sampled type discovery over whole datasets.
fn bench_discover_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("discover_types");
    let inferencer = TypeInferencer::new();

    for rows in [1_000, 10_000, 100_000].iter() {
        let dataset = generate_dataset(*rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, dataset| {
            let mut rng = fastrand::Rng::with_seed(42);
            b.iter(|| black_box(inferencer.discover_types(dataset, &mut rng)))
        });
    }

    group.finish();
}

/// Benchmark each outlier algorithm on a two-feature dataset.
fn bench_outlier_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("outlier_algorithms");
    group.sample_size(10);

    let dataset = generate_dataset(500);
    let columns = vec!["id".to_string(), "value".to_string()];
    let detector = EnsembleDetector::with_seed(42);

    for algorithm in OutlierAlgorithm::ALL {
        group.bench_with_input(
            BenchmarkId::new("algorithm", algorithm.as_str()),
            &algorithm,
            |b, algorithm| {
                b.iter(|| {
                    black_box(
                        detector
                            .identify_outliers(&dataset, &columns, 0.1, &[*algorithm])
                            .unwrap(),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_discover_types, bench_outlier_algorithms);
criterion_main!(benches);
