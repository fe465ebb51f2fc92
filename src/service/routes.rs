use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::backend::BackendHandles;
use crate::bench::{Executor, Strategy, WorkerPool};
use crate::core::BenchError;

/// First path segment of a benchmark route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Sync,
    Async,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Sync => "sync",
            Mode::Async => "async",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(Mode::Sync),
            "async" => Ok(Mode::Async),
            other => Err(BenchError::UnknownRoute(format!("unknown mode '{other}'"))),
        }
    }
}

const NATIVE_SUFFIX: &str = "-native";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub path: String,
    pub backend: &'static str,
    pub strategy: Strategy,
}

/// `(mode, segment)` → executor. For each backend `b`:
/// `/sync/b` is direct, `/async/b` offloads to the worker pool and
/// `/async/b-native` uses the backend's own async client when it has one.
pub struct RouteTable {
    routes: BTreeMap<(Mode, String), Executor>,
}

impl RouteTable {
    pub fn build(handles: &BackendHandles, pool: &Arc<WorkerPool>) -> Self {
        let mut routes = BTreeMap::new();
        for (name, entry) in handles.iter() {
            let candidates = [
                (Mode::Sync, name.to_string(), Strategy::Direct),
                (Mode::Async, name.to_string(), Strategy::PoolOffload),
                (Mode::Async, format!("{name}{NATIVE_SUFFIX}"), Strategy::NativeAsync),
            ];
            for (mode, segment, strategy) in candidates {
                if let Some(executor) = Executor::bind(entry, strategy, pool) {
                    routes.insert((mode, segment), executor);
                }
            }
        }
        Self { routes }
    }

    pub fn resolve(&self, mode: &str, segment: &str) -> Result<&Executor, BenchError> {
        let mode: Mode = mode.parse()?;
        self.routes
            .get(&(mode, segment.to_string()))
            .ok_or_else(|| BenchError::UnknownRoute(format!("/{mode}/{segment}")))
    }

    pub fn list(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|((mode, segment), executor)| RouteInfo {
                path: format!("/{mode}/{segment}"),
                backend: executor.backend_name(),
                strategy: executor.strategy(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendEntry, MemoryBackend, SqliteBackend};

    fn table() -> RouteTable {
        let mut handles = BackendHandles::new();
        handles
            .insert(BackendEntry::with_native(Arc::new(MemoryBackend::new())))
            .unwrap();
        handles
            .insert(BackendEntry::blocking_only(Arc::new(
                SqliteBackend::open_in_memory().unwrap(),
            )))
            .unwrap();
        RouteTable::build(&handles, &Arc::new(WorkerPool::new(2)))
    }

    #[test]
    fn test_route_listing() {
        let paths: Vec<(String, Strategy)> = table()
            .list()
            .into_iter()
            .map(|r| (r.path, r.strategy))
            .collect();
        assert_eq!(
            paths,
            vec![
                ("/sync/memory".to_string(), Strategy::Direct),
                ("/sync/sqlite".to_string(), Strategy::Direct),
                ("/async/memory".to_string(), Strategy::PoolOffload),
                ("/async/memory-native".to_string(), Strategy::NativeAsync),
                ("/async/sqlite".to_string(), Strategy::PoolOffload),
            ]
        );
    }

    #[test]
    fn test_resolve() {
        let table = table();
        let executor = table.resolve("async", "sqlite").unwrap();
        assert_eq!(executor.backend_name(), "sqlite");
        assert_eq!(executor.strategy(), Strategy::PoolOffload);

        assert!(matches!(
            table.resolve("async", "sqlite-native"),
            Err(BenchError::UnknownRoute(_))
        ));
        assert!(matches!(
            table.resolve("batch", "memory"),
            Err(BenchError::UnknownRoute(_))
        ));
    }
}
