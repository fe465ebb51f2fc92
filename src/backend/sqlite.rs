//! SQLite adapter (via rusqlite). Blocking only.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::info;
use rusqlite::{Connection, OptionalExtension, params};

use super::{BlockingBackend, Record, recover_setup_conflict};
use crate::conf::SqliteConfig;
use crate::core::BenchError;

const NAME: &str = "sqlite";

const CREATE_TABLE: &str = "CREATE TABLE bench (
    id   INTEGER PRIMARY KEY,
    name TEXT    NOT NULL
)";
const CREATE_INDEX: &str = "CREATE INDEX bench_name_idx ON bench(name)";

fn db_err(err: rusqlite::Error) -> BenchError {
    BenchError::backend(NAME, err.to_string())
}

/// `rusqlite::Connection` is not `Sync`, so the shared handle wraps it in a
/// mutex. That serializes statements on the connection only; a request's
/// steps can still interleave with another request's.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn open(config: &SqliteConfig) -> Result<Self, BenchError> {
        Self::open_path(&config.path)
    }

    pub fn open_path(path: &Path) -> Result<Self, BenchError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;
        info!("opened sqlite database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, BenchError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, BenchError> {
        self.conn
            .lock()
            .map_err(|e| BenchError::backend(NAME, format!("poisoned lock: {e}")))
    }

    fn exists(conn: &Connection, kind: &str, name: &str) -> Result<bool, BenchError> {
        conn.query_row(
            "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            params![kind, name],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(db_err)
    }

    /// Creates a schema object, reporting a conflict when `sqlite_master`
    /// already lists it.
    fn create(&self, kind: &str, name: &str, sql: &str) -> Result<(), BenchError> {
        let conn = self.conn()?;
        if Self::exists(&conn, kind, name)? {
            return Err(BenchError::SetupConflict(format!("{kind} {name}")));
        }
        conn.execute_batch(sql).map_err(db_err)?;
        info!("{NAME}: created {kind} {name}");
        Ok(())
    }
}

impl BlockingBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&self) -> Result<(), BenchError> {
        recover_setup_conflict(NAME, self.create("table", "bench", CREATE_TABLE))?;
        recover_setup_conflict(
            NAME,
            self.create("index", "bench_name_idx", CREATE_INDEX),
        )
    }

    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO bench (id, name) VALUES (?1, ?2)")
                .map_err(db_err)?;
            for record in records {
                stmt.execute(params![record.id, record.name])
                    .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;
        Ok(records.len())
    }

    fn scan_all(&self) -> Result<usize, BenchError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare_cached("SELECT id, name FROM bench ORDER BY id")
            .map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;
        let mut count = 0;
        while let Some(row) = rows.next().map_err(db_err)? {
            let _record = Record {
                id: row.get(0).map_err(db_err)?,
                name: row.get(1).map_err(db_err)?,
            };
            count += 1;
        }
        Ok(count)
    }

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare_cached("SELECT id, name FROM bench WHERE id = ?1")
            .map_err(db_err)?;
        stmt.query_row(params![key], |row| {
            Ok(Record {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .optional()
        .map_err(db_err)
    }

    fn bulk_delete(&self) -> Result<(), BenchError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM bench", []).map_err(db_err)?;
        Ok(())
    }
}
