use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use occipital::{accuracy, classification_report, ConfusionMatrix};

fn synthetic_labels(samples: usize, classes: usize) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(42);
    let y_true: Vec<usize> = (0..samples).map(|_| rng.gen_range(0..classes)).collect();
    // Roughly 80% agreement with the true labels.
    let y_pred: Vec<usize> = y_true
        .iter()
        .map(|&label| {
            if rng.gen_bool(0.8) {
                label
            } else {
                rng.gen_range(0..classes)
            }
        })
        .collect();
    (y_true, y_pred)
}

fn bench_confusion_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("ConfusionMatrix");
    group.sample_size(50);

    for &(samples, classes) in &[(1_000usize, 4usize), (10_000, 10), (100_000, 50)] {
        let (y_true, y_pred) = synthetic_labels(samples, classes);
        group.bench_function(format!("from_labels_{}x{}", samples, classes), |b| {
            b.iter(|| {
                ConfusionMatrix::from_labels(
                    black_box(classes),
                    black_box(&y_true),
                    black_box(&y_pred),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("Report");
    group.sample_size(50);

    let classes = 10;
    let names: Vec<String> = (0..classes).map(|i| format!("class_{}", i)).collect();
    let (y_true, y_pred) = synthetic_labels(10_000, classes);
    let cm = ConfusionMatrix::from_labels(classes, &y_true, &y_pred).unwrap();

    group.bench_function("accuracy_10k", |b| {
        b.iter(|| accuracy(black_box(&y_true), black_box(&y_pred)))
    });
    group.bench_function("classification_report_10", |b| {
        b.iter(|| classification_report(black_box(&cm), black_box(&names)))
    });

    group.finish();
}

criterion_group!(benches, bench_confusion_matrix, bench_report);
criterion_main!(benches);
