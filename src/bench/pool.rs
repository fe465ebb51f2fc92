use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::conf::PoolConfig;
use crate::core::BenchError;

/// Bounded pool for blocking jobs. A semaphore caps how many jobs are in
/// flight; admitted jobs run on tokio's blocking threads, so the caller's task
/// suspends without tying up a runtime worker.
#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.max_workers)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a free slot, runs `job` on a blocking thread and resumes
    /// with its output. The slot is released when the job returns, even if
    /// the caller stopped waiting.
    pub async fn run<F, T>(&self, job: F) -> Result<T, BenchError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| BenchError::WorkerPool(e.to_string()))?;
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });
        Ok(handle.await?)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::from_config(&PoolConfig::default())
    }
}
