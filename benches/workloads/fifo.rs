use criterion::{black_box, Criterion, Throughput};
use mapdeque::MapDeque;

const WINDOW: usize = 1_000;
const OPS: usize = 100_000;

pub fn run(c: &mut Criterion) {
    bench_sliding_window(c);
    bench_fill_drain(c);
}

/// Steady-state queue: every push at the back retires an element at the
/// front, so chunks are acquired and released continuously.
fn bench_sliding_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo_window");
    group.warm_up_time(std::time::Duration::from_millis(500));
    group.throughput(Throughput::Elements(OPS as u64));

    group.bench_function("k10_u64", |b| {
        b.iter(|| {
            let mut dq: MapDeque<u64> = (0..WINDOW as u64).collect();
            for i in 0..OPS as u64 {
                dq.push_back(black_box(i));
                black_box(dq.pop_front());
            }
            black_box(dq.len())
        })
    });

    group.bench_function("k64_u64", |b| {
        b.iter(|| {
            let mut dq: MapDeque<u64, 64> = (0..WINDOW as u64).collect();
            for i in 0..OPS as u64 {
                dq.push_back(black_box(i));
                black_box(dq.pop_front());
            }
            black_box(dq.len())
        })
    });

    group.finish();
}

fn bench_fill_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo_fill_drain");
    group.throughput(Throughput::Elements(OPS as u64));

    group.bench_function("front_in_back_out", |b| {
        b.iter(|| {
            let mut dq: MapDeque<u64, 16> = MapDeque::new();
            for i in 0..OPS as u64 {
                dq.push_front(black_box(i));
            }
            while let Some(x) = dq.pop_back() {
                black_box(x);
            }
        })
    });

    group.finish();
}
