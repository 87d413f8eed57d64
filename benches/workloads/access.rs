use criterion::{black_box, Criterion, Throughput};
use mapdeque::MapDeque;

const LEN: usize = 100_000;

pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("access");
    group.throughput(Throughput::Elements(LEN as u64));

    let dq: MapDeque<u64, 10> = (0..LEN as u64).collect();
    group.bench_function("index_k10", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..LEN {
                sum = sum.wrapping_add(dq[black_box(i)]);
            }
            sum
        })
    });

    let dq: MapDeque<u64, 16> = (0..LEN as u64).collect();
    group.bench_function("index_k16", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..LEN {
                sum = sum.wrapping_add(dq[black_box(i)]);
            }
            sum
        })
    });

    group.bench_function("iter_k16", |b| b.iter(|| black_box(&dq).iter().sum::<u64>()));

    group.finish();
}
