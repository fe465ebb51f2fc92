//! Benchmark execution core: timing, workload, scheduling and reporting.

mod pool;
mod report;
mod runner;
mod strategy;
mod timer;
mod workload;

pub use pool::WorkerPool;
pub use report::{BenchmarkResult, result_key, serialize};
pub use runner::BenchmarkRunner;
pub use strategy::{Executor, Strategy};
pub use timer::{Measured, TimingSample, measure, measure_async};
pub use workload::{StepKind, Workload, generate_dataset};
