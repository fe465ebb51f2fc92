use std::time::Duration;

use log::{debug, error};

use super::report::BenchmarkResult;
use super::timer::{Measured, measure_async};
use super::{Executor, Workload};
use crate::core::BenchError;

/// Drives a [`Workload`] through one [`Executor`].
pub struct BenchmarkRunner<'a> {
    workload: &'a Workload,
    executor: &'a Executor,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(workload: &'a Workload, executor: &'a Executor) -> Self {
        Self { workload, executor }
    }

    /// Runs every step in order, timing each one around the executor call.
    ///
    /// A step does not start until the previous step's sample is closed. The
    /// first failing step ends the run and its error is returned; steps after
    /// it are not executed and no partial result is produced.
    pub async fn run(&self) -> Result<BenchmarkResult, BenchError> {
        let backend = self.executor.backend_name();
        let strategy = self.executor.strategy();
        let steps = self.workload.steps();
        let mut timings: Vec<(_, Duration)> = Vec::with_capacity(steps.len());

        for &step in steps {
            let title = format!("{step} in {backend} ({strategy})");
            let operation = self.workload.operation(step);
            let Measured { sample, value } =
                measure_async(title, self.executor.run(operation)).await;

            let outcome = value.inspect_err(|e| {
                error!("{step} in {backend} ({strategy}) failed, aborting run: {e}");
            })?;
            debug!("{step} in {backend} ({strategy}): {outcome}");
            timings.push((step, sample.duration()?));
        }

        Ok(BenchmarkResult::new(timings))
    }
}
