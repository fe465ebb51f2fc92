//! Storage backends the workload runs against.
//!
//! A backend is reached through one of two capability traits: [`BlockingBackend`]
//! for client libraries that block the calling thread, and [`AsyncBackend`] for
//! clients with a native non-blocking call path. A technology may implement both.

mod handles;
mod memory;
mod mongo;
mod redis;
mod sqlite;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::BenchError;

pub use handles::{BackendEntry, BackendHandles};
pub use memory::MemoryBackend;
pub use mongo::MongoBackend;
pub use self::redis::RedisBackend;
pub use sqlite::SqliteBackend;

/// One row of the benchmark dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
}

/// A workload step bound to its arguments, ready to be shipped to whichever
/// execution context runs it.
#[derive(Debug, Clone)]
pub enum Operation {
    BulkInsert(Arc<[Record]>),
    ScanAll,
    PointLookup(i64),
    BulkDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Inserted(usize),
    Scanned(usize),
    Found(Option<Record>),
    Deleted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Inserted(n) => write!(f, "inserted {n} records"),
            Outcome::Scanned(n) => write!(f, "scanned {n} records"),
            Outcome::Found(Some(record)) => write!(f, "found record {}", record.id),
            Outcome::Found(None) => write!(f, "record not found"),
            Outcome::Deleted => write!(f, "dataset deleted"),
        }
    }
}

/// Blocking call path of a storage technology.
pub trait BlockingBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Creates the namespace, table and index. Called once per process.
    /// Implementations report already-existing objects as
    /// [`BenchError::SetupConflict`]; see [`recover_setup_conflict`].
    fn setup(&self) -> Result<(), BenchError>;

    /// Fails if any record's id is already present.
    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError>;

    /// Drains the full result cursor and returns how many records it held.
    fn scan_all(&self) -> Result<usize, BenchError>;

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError>;

    /// Removes the whole benchmark dataset.
    fn bulk_delete(&self) -> Result<(), BenchError>;
}

/// Native non-blocking call path of a storage technology.
#[async_trait]
pub trait AsyncBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError>;

    async fn scan_all(&self) -> Result<usize, BenchError>;

    async fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError>;

    async fn bulk_delete(&self) -> Result<(), BenchError>;
}

pub fn apply_blocking(
    backend: &dyn BlockingBackend,
    operation: &Operation,
) -> Result<Outcome, BenchError> {
    match operation {
        Operation::BulkInsert(records) => backend.bulk_insert(records).map(Outcome::Inserted),
        Operation::ScanAll => backend.scan_all().map(Outcome::Scanned),
        Operation::PointLookup(key) => backend.point_lookup(*key).map(Outcome::Found),
        Operation::BulkDelete => backend.bulk_delete().map(|_| Outcome::Deleted),
    }
}

pub async fn apply_async(
    backend: &dyn AsyncBackend,
    operation: &Operation,
) -> Result<Outcome, BenchError> {
    match operation {
        Operation::BulkInsert(records) => {
            backend.bulk_insert(records).await.map(Outcome::Inserted)
        }
        Operation::ScanAll => backend.scan_all().await.map(Outcome::Scanned),
        Operation::PointLookup(key) => backend.point_lookup(*key).await.map(Outcome::Found),
        Operation::BulkDelete => backend.bulk_delete().await.map(|_| Outcome::Deleted),
    }
}

/// Treats a setup conflict as success, logging it. Any other error passes through.
pub fn recover_setup_conflict(
    backend: &str,
    result: Result<(), BenchError>,
) -> Result<(), BenchError> {
    match result {
        Err(BenchError::SetupConflict(what)) => {
            warn!("{backend}: {what} already exists, skipping");
            Ok(())
        }
        other => other,
    }
}
