//! In-process ordered map. Needs no external service, which makes it the
//! baseline the other backends are compared against.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{AsyncBackend, BlockingBackend, Record};
use crate::core::BenchError;

const NAME: &str = "memory";

#[derive(Default)]
pub struct MemoryBackend {
    rows: RwLock<BTreeMap<i64, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, BenchError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BenchError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<i64, String>>, BenchError> {
        self.rows
            .read()
            .map_err(|e| BenchError::backend(NAME, format!("poisoned lock: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<i64, String>>, BenchError> {
        self.rows
            .write()
            .map_err(|e| BenchError::backend(NAME, format!("poisoned lock: {e}")))
    }

    fn insert_all(&self, records: &[Record]) -> Result<usize, BenchError> {
        let mut staged = BTreeMap::new();
        for record in records {
            if staged.insert(record.id, record.name.clone()).is_some() {
                return Err(BenchError::backend(
                    NAME,
                    format!("duplicate key {} within batch", record.id),
                ));
            }
        }

        let mut rows = self.write()?;
        if let Some(id) = staged.keys().find(|id| rows.contains_key(*id)) {
            return Err(BenchError::backend(NAME, format!("duplicate key {id}")));
        }
        rows.append(&mut staged);
        Ok(records.len())
    }

    fn drain_count(&self) -> Result<usize, BenchError> {
        let rows = self.read()?;
        let scanned: Vec<Record> = rows
            .iter()
            .map(|(id, name)| Record {
                id: *id,
                name: name.clone(),
            })
            .collect();
        Ok(scanned.len())
    }

    fn get(&self, key: i64) -> Result<Option<Record>, BenchError> {
        Ok(self.read()?.get(&key).map(|name| Record {
            id: key,
            name: name.clone(),
        }))
    }

    fn clear(&self) -> Result<(), BenchError> {
        self.write()?.clear();
        Ok(())
    }
}

impl BlockingBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&self) -> Result<(), BenchError> {
        Ok(())
    }

    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        self.insert_all(records)
    }

    fn scan_all(&self) -> Result<usize, BenchError> {
        self.drain_count()
    }

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        self.get(key)
    }

    fn bulk_delete(&self) -> Result<(), BenchError> {
        self.clear()
    }
}

/// The map never waits on I/O, so the native path takes the lock inline and
/// completes on first poll.
#[async_trait]
impl AsyncBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        self.insert_all(records)
    }

    async fn scan_all(&self) -> Result<usize, BenchError> {
        self.drain_count()
    }

    async fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        self.get(key)
    }

    async fn bulk_delete(&self) -> Result<(), BenchError> {
        self.clear()
    }
}
