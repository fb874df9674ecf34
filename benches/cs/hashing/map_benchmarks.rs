use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hashtables::hashing::{ChainedHashMap, DoubleHashingMap, PerfectHashMapBuilder};

const N: usize = 10_000;

fn keys() -> Vec<String> {
    (0..N).map(|i| format!("key{}", i)).collect()
}

fn bench_insert(c: &mut Criterion) {
    let ks = keys();
    let mut group = c.benchmark_group("insert_10k");
    group.bench_function("double_hashing", |b| {
        b.iter(|| {
            let mut map = DoubleHashingMap::new();
            for (i, k) in ks.iter().enumerate() {
                map.insert(black_box(k.clone()), i);
            }
            map
        })
    });
    group.bench_function("separate_chaining", |b| {
        b.iter(|| {
            let mut map = ChainedHashMap::new();
            for (i, k) in ks.iter().enumerate() {
                map.insert(black_box(k.clone()), i);
            }
            map
        })
    });
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let ks = keys();
    let mut open = DoubleHashingMap::new();
    let mut chained = ChainedHashMap::new();
    let mut perfect = PerfectHashMapBuilder::new()
        .with_seed(3)
        .build(ks.clone())
        .unwrap();
    for (i, k) in ks.iter().enumerate() {
        open.insert(k.clone(), i);
        chained.insert(k.clone(), i);
        perfect.insert(k.clone(), i);
    }

    let mut group = c.benchmark_group("get_10k");
    group.bench_function("double_hashing", |b| {
        b.iter(|| ks.iter().filter_map(|k| open.get(black_box(k))).sum::<usize>())
    });
    group.bench_function("separate_chaining", |b| {
        b.iter(|| ks.iter().filter_map(|k| chained.get(black_box(k))).sum::<usize>())
    });
    group.bench_function("perfect", |b| {
        b.iter(|| ks.iter().filter_map(|k| perfect.get(black_box(k))).sum::<usize>())
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get);
criterion_main!(benches);
