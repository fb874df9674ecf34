use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hashtables::hashing::PerfectHashMapBuilder;

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key{}", i)).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("perfect_build");
    for n in [100usize, 1_000, 10_000] {
        let ks = keys(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ks, |b, ks| {
            b.iter(|| {
                PerfectHashMapBuilder::new()
                    .with_seed(1)
                    .build::<String, usize, _>(black_box(ks.clone()))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let ks = keys(10_000);
    let mut map = PerfectHashMapBuilder::new()
        .with_seed(1)
        .build(ks.clone())
        .unwrap();
    for (i, k) in ks.iter().enumerate() {
        map.insert(k.clone(), i);
    }
    c.bench_function("perfect_lookup_10k", |b| {
        b.iter(|| {
            let mut sum = 0usize;
            for k in &ks {
                sum += map.get(black_box(k)).copied().unwrap_or(0);
            }
            sum
        })
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
