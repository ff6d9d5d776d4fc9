use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use genomic_sketch::HyperLogLog;

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_add");

    for precision in [10, 12, 14] {
        group.bench_with_input(BenchmarkId::new("add", precision), &precision, |b, &p| {
            let mut hll = HyperLogLog::new(p).unwrap();
            let mut counter = 0u64;
            b.iter(|| {
                hll.add(black_box(counter));
                counter += 1;
            });
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_estimate");

    for (n, precision) in [(1000, 12), (10000, 12), (100_000, 14)] {
        let mut hll = HyperLogLog::new(precision).unwrap();
        for i in 0..n {
            hll.add(i);
        }

        group.bench_with_input(BenchmarkId::new("estimate", format!("n={n}_p={precision}")), &(), |b, _| {
            b.iter(|| black_box(hll.estimate()));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_merge");

    group.bench_function("merge_two_hlls", |b| {
        b.iter_batched(
            || {
                let mut hll1 = HyperLogLog::new(12).unwrap();
                let mut hll2 = HyperLogLog::new(12).unwrap();
                for i in 0..5000 {
                    hll1.add(i);
                    hll2.add(i + 5000);
                }
                (hll1, hll2)
            },
            |(mut hll1, hll2)| {
                hll1.merge(&hll2).unwrap();
                black_box(hll1);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_serialization");

    let mut hll = HyperLogLog::new(12).unwrap();
    for i in 0..10_000 {
        hll.add(i);
    }

    group.bench_function("save", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            hll.save(&mut buf).unwrap();
            black_box(buf);
        });
    });

    let mut bytes = Vec::new();
    hll.save(&mut bytes).unwrap();
    group.bench_function("load", |b| {
        b.iter(|| black_box(HyperLogLog::load(std::io::Cursor::new(&bytes), std::path::Path::new("bench")).unwrap()));
    });

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperloglog_pipeline");

    for n in [1000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("full_pipeline", n), &n, |b, &n| {
            b.iter(|| {
                let mut hll = HyperLogLog::new(12).unwrap();
                for i in 0..n {
                    hll.add(i);
                }
                black_box(hll.estimate())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add, bench_estimate, bench_merge, bench_serialization, bench_full_pipeline,);

criterion_main!(benches);
