use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nutri_core::{classify, Measurement};

fn synthetic_measurements(n: usize) -> Vec<Measurement> {
    (0..n)
        .map(|i| {
            let height = 60.0 + (i % 60) as f64;
            let weight = 5.0 + ((i * 7) % 150) as f64 / 10.0;
            let muac = 10.5 + ((i * 3) % 60) as f64 / 10.0;
            Measurement::new(height, weight, muac)
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify single", |b| {
        b.iter(|| classify(black_box(85.0), black_box(10.5), black_box(13.5)))
    });

    let batch = synthetic_measurements(10_000);
    c.bench_function("classify 10k measurements", |b| {
        b.iter_batched(
            || batch.clone(),
            |ms| {
                let mut severe = 0usize;
                for m in &ms {
                    if m.classify().status.severity() == 2 {
                        severe += 1;
                    }
                }
                severe
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
