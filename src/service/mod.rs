mod routes;

use std::sync::Arc;

use log::info;

use crate::backend::BackendHandles;
use crate::bench::{BenchmarkResult, BenchmarkRunner, WorkerPool, Workload};
use crate::conf::Config;
use crate::core::BenchError;

pub use routes::{Mode, RouteInfo, RouteTable};

/// Everything a request needs to run a benchmark: the workload and the
/// route table, whose executors own the backend handles and offload pool.
pub struct BenchService {
    workload: Workload,
    routes: RouteTable,
}

impl BenchService {
    pub async fn new(config: &Config) -> Result<Self, BenchError> {
        let handles = BackendHandles::connect(&config.backends).await?;
        let pool = Arc::new(WorkerPool::from_config(&config.pool));
        let workload = Workload::from_config(&config.workload);
        Ok(Self::with_handles(handles, workload, pool))
    }

    pub fn with_handles(handles: BackendHandles, workload: Workload, pool: Arc<WorkerPool>) -> Self {
        let routes = RouteTable::build(&handles, &pool);
        info!(
            "{} backends, {} routes, dataset of {} records, {} offload workers",
            handles.len(),
            routes.len(),
            workload.dataset_size(),
            pool.size()
        );
        Self { workload, routes }
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes.list()
    }

    /// Runs the full workload on the executor behind `/{mode}/{segment}`.
    pub async fn run(&self, mode: &str, segment: &str) -> Result<BenchmarkResult, BenchError> {
        let executor = self.routes.resolve(mode, segment)?;
        info!("running benchmark /{mode}/{segment}");
        BenchmarkRunner::new(&self.workload, executor).run().await
    }
}
