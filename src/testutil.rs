//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::backend::{
    AsyncBackend, BackendEntry, BackendHandles, BlockingBackend, MemoryBackend, Record,
    SqliteBackend,
};
use crate::bench::{StepKind, WorkerPool, Workload};
use crate::core::BenchError;
use crate::service::BenchService;

/// In-memory backend that loses its "connection" on a chosen step.
///
/// Every call made while the connection is down fails with a backend error.
/// Calls to the other steps are forwarded to an inner [`MemoryBackend`], so
/// tests can inspect what state a failed run left behind.
pub struct FaultyBackend {
    inner: Arc<MemoryBackend>,
    fail_on: StepKind,
    severed: AtomicBool,
}

impl FaultyBackend {
    pub const NAME: &'static str = "faulty";

    pub fn new(fail_on: StepKind) -> Self {
        Self {
            inner: Arc::new(MemoryBackend::new()),
            fail_on,
            severed: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &MemoryBackend {
        &self.inner
    }

    fn check(&self, step: StepKind) -> Result<(), BenchError> {
        if step == self.fail_on {
            self.severed.store(true, Ordering::SeqCst);
        }
        if self.severed.load(Ordering::SeqCst) {
            return Err(BenchError::backend(
                Self::NAME,
                format!("connection severed before {step}"),
            ));
        }
        Ok(())
    }
}

impl BlockingBackend for FaultyBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn setup(&self) -> Result<(), BenchError> {
        Ok(())
    }

    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        self.check(StepKind::BulkInsert)?;
        BlockingBackend::bulk_insert(self.inner.as_ref(), records)
    }

    fn scan_all(&self) -> Result<usize, BenchError> {
        self.check(StepKind::ScanAll)?;
        BlockingBackend::scan_all(self.inner.as_ref())
    }

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        self.check(StepKind::PointLookup)?;
        BlockingBackend::point_lookup(self.inner.as_ref(), key)
    }

    fn bulk_delete(&self) -> Result<(), BenchError> {
        self.check(StepKind::BulkDelete)?;
        BlockingBackend::bulk_delete(self.inner.as_ref())
    }
}

#[async_trait]
impl AsyncBackend for FaultyBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        BlockingBackend::bulk_insert(self, records)
    }

    async fn scan_all(&self) -> Result<usize, BenchError> {
        BlockingBackend::scan_all(self)
    }

    async fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        BlockingBackend::point_lookup(self, key)
    }

    async fn bulk_delete(&self) -> Result<(), BenchError> {
        BlockingBackend::bulk_delete(self)
    }
}

/// Backend handles used across the integration tests.
pub struct Fixture {
    pub memory: Arc<MemoryBackend>,
    pub faulty: Arc<FaultyBackend>,
    pub sqlite: Option<Arc<SqliteBackend>>,
}

impl Fixture {
    /// Memory backend plus a backend that fails on `ScanAll`.
    pub fn new() -> Self {
        Self {
            memory: Arc::new(MemoryBackend::new()),
            faulty: Arc::new(FaultyBackend::new(StepKind::ScanAll)),
            sqlite: None,
        }
    }

    /// Adds a file-backed sqlite backend under `dir`.
    pub fn with_sqlite(mut self, dir: &Path) -> Result<Self, BenchError> {
        self.sqlite = Some(Arc::new(SqliteBackend::open_path(&dir.join("bench.sqlite3"))?));
        Ok(self)
    }

    pub fn handles(&self) -> Result<BackendHandles, BenchError> {
        let mut handles = BackendHandles::new();
        handles.insert(BackendEntry::with_native(self.memory.clone()))?;
        handles.insert(BackendEntry::with_native(self.faulty.clone()))?;
        if let Some(sqlite) = &self.sqlite {
            handles.insert(BackendEntry::blocking_only(sqlite.clone()))?;
        }
        Ok(handles)
    }

    pub fn service(&self, workload: Workload) -> Result<BenchService, BenchError> {
        Ok(BenchService::with_handles(
            self.handles()?,
            workload,
            Arc::new(WorkerPool::new(4)),
        ))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
