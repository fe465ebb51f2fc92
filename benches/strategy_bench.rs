//! Compares the three scheduling strategies on the in-memory backend.

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use crudbench::backend::{BackendEntry, MemoryBackend};
use crudbench::bench::{BenchmarkRunner, Executor, Strategy, WorkerPool, Workload};

const DATASET_SIZES: &[usize] = &[1_000, 10_000];

fn bench_strategies(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pool = Arc::new(WorkerPool::new(8));
    let entry = BackendEntry::with_native(Arc::new(MemoryBackend::new()));

    let mut group = c.benchmark_group("workload/memory");
    group.measurement_time(Duration::from_secs(10));

    for &size in DATASET_SIZES {
        let workload = Workload::new(size, (size / 2) as i64);
        for strategy in [Strategy::Direct, Strategy::PoolOffload, Strategy::NativeAsync] {
            let executor = Executor::bind(&entry, strategy, &pool).unwrap();
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), size),
                &workload,
                |b, workload| {
                    b.to_async(&rt).iter(|| async {
                        let result = BenchmarkRunner::new(workload, &executor)
                            .run()
                            .await
                            .unwrap();
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
