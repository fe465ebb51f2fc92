use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use tempfile::TempDir;

use crudbench::backend::{
    BackendEntry, BlockingBackend, MemoryBackend, Operation, Outcome, Record, SqliteBackend,
};
use crudbench::bench::{BenchmarkRunner, Executor, StepKind, Strategy, WorkerPool, Workload};
use crudbench::core::BenchError;
use crudbench::testutil::FaultyBackend;

fn memory_entry() -> (Arc<MemoryBackend>, BackendEntry) {
    let backend = Arc::new(MemoryBackend::new());
    (backend.clone(), BackendEntry::with_native(backend))
}

fn pool() -> Arc<WorkerPool> {
    Arc::new(WorkerPool::new(4))
}

#[rstest]
#[case::direct(Strategy::Direct)]
#[case::offload(Strategy::PoolOffload)]
#[case::native(Strategy::NativeAsync)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_workload_on_memory(#[case] strategy: Strategy) {
    let (store, entry) = memory_entry();
    let executor = Executor::bind(&entry, strategy, &pool()).unwrap();
    let workload = Workload::default();

    for _ in 0..2 {
        let result = BenchmarkRunner::new(&workload, &executor).run().await.unwrap();
        let steps: Vec<StepKind> = result.iter().map(|(step, _)| step).collect();
        assert_eq!(steps, StepKind::ORDER.to_vec());
        assert_eq!(store.len(), Ok(0));
    }
}

#[rstest]
#[case::direct(Strategy::Direct)]
#[case::offload(Strategy::PoolOffload)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_workload_on_sqlite(#[case] strategy: Strategy) {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(SqliteBackend::open_path(&dir.path().join("bench.sqlite3")).unwrap());
    backend.setup().unwrap();
    let entry = BackendEntry::blocking_only(backend.clone());
    let executor = Executor::bind(&entry, strategy, &pool()).unwrap();
    let workload = Workload::default();

    for _ in 0..2 {
        let result = BenchmarkRunner::new(&workload, &executor).run().await.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(backend.scan_all(), Ok(0));
    }
}

#[rstest]
#[case::direct(Strategy::Direct)]
#[case::offload(Strategy::PoolOffload)]
#[case::native(Strategy::NativeAsync)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_step_results_after_insert(#[case] strategy: Strategy) {
    let (_store, entry) = memory_entry();
    let executor = Executor::bind(&entry, strategy, &pool()).unwrap();
    let workload = Workload::default();

    executor
        .run(workload.operation(StepKind::BulkInsert))
        .await
        .unwrap();
    assert_eq!(
        executor.run(Operation::ScanAll).await,
        Ok(Outcome::Scanned(10_000))
    );
    assert_eq!(
        executor.run(workload.operation(StepKind::PointLookup)).await,
        Ok(Outcome::Found(Some(Record {
            id: 5555,
            name: "name5555".to_string()
        })))
    );
    for missing in [-1, 10_000, 123_456] {
        assert_eq!(
            executor.run(Operation::PointLookup(missing)).await,
            Ok(Outcome::Found(None))
        );
    }
    executor.run(Operation::BulkDelete).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_strategies_time_insert_comparably() {
    let workload = Workload::default();
    let mut inserts = Vec::new();
    for strategy in [Strategy::Direct, Strategy::PoolOffload, Strategy::NativeAsync] {
        let (_store, entry) = memory_entry();
        let executor = Executor::bind(&entry, strategy, &pool()).unwrap();
        let result = BenchmarkRunner::new(&workload, &executor).run().await.unwrap();
        inserts.push(result.get(StepKind::BulkInsert).unwrap());
    }

    let fastest = inserts.iter().min().copied().unwrap().max(Duration::from_millis(1));
    let slowest = inserts.iter().max().copied().unwrap();
    assert!(
        slowest < fastest * 10,
        "bulk insert timings diverge: {inserts:?}"
    );
}

#[rstest]
#[case::direct(Strategy::Direct)]
#[case::offload(Strategy::PoolOffload)]
#[case::native(Strategy::NativeAsync)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fault_stops_the_run(#[case] strategy: Strategy) {
    let faulty = Arc::new(FaultyBackend::new(StepKind::ScanAll));
    let entry = BackendEntry::with_native(faulty.clone());
    let executor = Executor::bind(&entry, strategy, &pool()).unwrap();
    let workload = Workload::new(100, 50);

    let err = BenchmarkRunner::new(&workload, &executor).run().await.unwrap_err();
    assert_eq!(
        err,
        BenchError::backend("faulty", "connection severed before scan_all")
    );
    assert_eq!(faulty.store().len(), Ok(100));
}
