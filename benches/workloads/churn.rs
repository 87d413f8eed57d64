use criterion::{black_box, Criterion, Throughput};
use mapdeque::MapDeque;
use std::thread;

const OPS_PER_THREAD: usize = 50_000;
const DEQUES_PER_THREAD: usize = 64;

struct XorShift64 {
    a: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { a: if seed == 0 { 1 } else { seed } }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.a;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.a = x;
        x
    }
}

/// Many small deques per thread, each randomly growing or shrinking at
/// either end. Dominated by chunk and map allocation, so it is the workload
/// that separates the global allocators.
pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for &t in &[1usize, 2, 4, 8] {
        group.throughput(Throughput::Elements((OPS_PER_THREAD * t) as u64));
        group.bench_function(format!("churn_{t}_threads"), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..t)
                    .map(|i| {
                        thread::spawn(move || {
                            let mut rng = XorShift64::new((i as u64 + 1) * 0x9e37_79b9);
                            let mut deques: Vec<MapDeque<u64, 8>> =
                                (0..DEQUES_PER_THREAD).map(|_| MapDeque::new()).collect();
                            for _ in 0..OPS_PER_THREAD {
                                let r = rng.next();
                                let dq = &mut deques[(r as usize) % DEQUES_PER_THREAD];
                                match (r >> 32) % 4 {
                                    0 => dq.push_back(r),
                                    1 => dq.push_front(r),
                                    2 => {
                                        black_box(dq.pop_back());
                                    }
                                    _ => {
                                        black_box(dq.pop_front());
                                    }
                                }
                            }
                            deques.iter().map(MapDeque::len).sum::<usize>()
                        })
                    })
                    .collect();

                for h in handles {
                    black_box(h.join().unwrap());
                }
            })
        });
    }
    group.finish();
}
