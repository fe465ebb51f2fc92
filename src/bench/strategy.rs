use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::WorkerPool;
use crate::backend::{
    AsyncBackend, BackendEntry, BlockingBackend, Operation, Outcome, apply_async, apply_blocking,
};
use crate::core::BenchError;

/// How a backend operation is scheduled relative to the calling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Blocking call on the calling thread.
    Direct,
    /// Blocking call handed to the [`WorkerPool`]; the caller suspends.
    PoolOffload,
    /// The backend's own non-blocking call path.
    NativeAsync,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::PoolOffload => "pool_offload",
            Strategy::NativeAsync => "native_async",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend bound to a strategy. Backend choice and scheduling choice are
/// independent; any pairing the backend supports can be built here.
#[derive(Clone)]
pub enum Executor {
    Direct(Arc<dyn BlockingBackend>),
    PoolOffload {
        backend: Arc<dyn BlockingBackend>,
        pool: Arc<WorkerPool>,
    },
    NativeAsync(Arc<dyn AsyncBackend>),
}

impl Executor {
    /// Returns `None` for `NativeAsync` when the backend has no native path.
    pub fn bind(entry: &BackendEntry, strategy: Strategy, pool: &Arc<WorkerPool>) -> Option<Self> {
        match strategy {
            Strategy::Direct => Some(Executor::Direct(entry.blocking.clone())),
            Strategy::PoolOffload => Some(Executor::PoolOffload {
                backend: entry.blocking.clone(),
                pool: pool.clone(),
            }),
            Strategy::NativeAsync => entry.native.clone().map(Executor::NativeAsync),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Executor::Direct(_) => Strategy::Direct,
            Executor::PoolOffload { .. } => Strategy::PoolOffload,
            Executor::NativeAsync(_) => Strategy::NativeAsync,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Executor::Direct(backend) | Executor::PoolOffload { backend, .. } => backend.name(),
            Executor::NativeAsync(backend) => backend.name(),
        }
    }

    /// Runs one operation and resumes the caller once its result or fault is
    /// available. Nothing happens until the returned future is polled.
    pub async fn run(&self, operation: Operation) -> Result<Outcome, BenchError> {
        match self {
            // Occupies the polling thread for the whole call.
            Executor::Direct(backend) => apply_blocking(backend.as_ref(), &operation),
            Executor::PoolOffload { backend, pool } => {
                let backend = backend.clone();
                pool.run(move || apply_blocking(backend.as_ref(), &operation))
                    .await?
            }
            Executor::NativeAsync(backend) => apply_async(backend.as_ref(), &operation).await,
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("backend", &self.backend_name())
            .field("strategy", &self.strategy())
            .finish()
    }
}
