use core::hint::black_box;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use crew::{CancellationToken, Config, WorkerPool};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::runtime::Builder;

const ITEMS: u64 = 4096;

/// Submits `ITEMS` trivial jobs from a single producer and waits until all of
/// them ran. Measures hand-off overhead for each queue shape.
fn bench_submit(c: &mut Criterion) {
    let rt = Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("failed to build runtime");

    let mut group = c.benchmark_group("submit");
    group.throughput(Throughput::Elements(ITEMS));

    for (workers, capacity) in [(1, 0), (4, 0), (4, 64), (16, 256)] {
        let token = CancellationToken::new();
        let pool = {
            let _guard = rt.enter();
            WorkerPool::start(token.clone(), Config::new(workers, capacity))
        };
        let done = Arc::new(AtomicU64::new(0));

        group.bench_with_input(
            BenchmarkId::new(format!("workers_{workers}"), format!("capacity_{capacity}")),
            &(),
            |b, ()| {
                b.to_async(&rt).iter(|| async {
                    let start = done.load(Ordering::Acquire);
                    for _ in 0..ITEMS {
                        let done = done.clone();
                        pool.submit_fn(move || {
                            done.fetch_add(1, Ordering::AcqRel);
                        })
                        .await
                        .expect("pool stopped during benchmark");
                    }
                    while done.load(Ordering::Acquire) - start < ITEMS {
                        tokio::task::yield_now().await;
                    }
                    black_box(done.load(Ordering::Relaxed))
                });
            },
        );

        token.cancel();
        rt.block_on(pool.closed());
    }

    group.finish();
}

criterion_group!(benches, bench_submit);
criterion_main!(benches);
