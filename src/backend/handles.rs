use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;

use super::{
    AsyncBackend, BlockingBackend, MemoryBackend, MongoBackend, RedisBackend, SqliteBackend,
};
use crate::conf::BackendsConfig;
use crate::core::BenchError;

/// One live handle for a backend technology, exposing whichever call paths it has.
#[derive(Clone)]
pub struct BackendEntry {
    pub blocking: Arc<dyn BlockingBackend>,
    pub native: Option<Arc<dyn AsyncBackend>>,
}

impl BackendEntry {
    pub fn blocking_only(backend: Arc<dyn BlockingBackend>) -> Self {
        Self {
            blocking: backend,
            native: None,
        }
    }

    pub fn with_native<B>(backend: Arc<B>) -> Self
    where
        B: BlockingBackend + AsyncBackend + 'static,
    {
        Self {
            blocking: backend.clone(),
            native: Some(backend),
        }
    }

    pub fn name(&self) -> &'static str {
        self.blocking.name()
    }
}

/// Process-wide backend handles, opened once at start-up and shared by every
/// request and every strategy. Nothing here isolates concurrent requests from
/// each other's writes.
#[derive(Clone, Default)]
pub struct BackendHandles {
    entries: BTreeMap<String, BackendEntry>,
}

impl BackendHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens every configured backend and runs its one-time setup.
    pub async fn connect(config: &BackendsConfig) -> Result<Self, BenchError> {
        let mut handles = Self::new();

        if config.memory {
            handles.insert(BackendEntry::with_native(Arc::new(MemoryBackend::new())))?;
        }
        if let Some(sqlite) = &config.sqlite {
            let backend = SqliteBackend::open(sqlite)?;
            handles.insert(BackendEntry::blocking_only(Arc::new(backend)))?;
        }
        if let Some(redis) = &config.redis {
            let backend = RedisBackend::connect(redis).await?;
            handles.insert(BackendEntry::with_native(Arc::new(backend)))?;
        }
        if let Some(mongo) = &config.mongo {
            let backend = MongoBackend::connect(mongo).await?;
            handles.insert(BackendEntry::with_native(Arc::new(backend)))?;
        }

        Ok(handles)
    }

    /// Registers a handle after running its setup. Setup conflicts are
    /// absorbed by the backend; anything else fails the registration.
    pub fn insert(&mut self, entry: BackendEntry) -> Result<(), BenchError> {
        entry.blocking.setup()?;
        info!(
            "backend '{}' ready (native async: {})",
            entry.name(),
            entry.native.is_some()
        );
        self.entries.insert(entry.name().to_string(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BackendEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BackendEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
