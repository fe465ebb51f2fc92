//! Redis adapter.
//!
//! Each record is a string key `<namespace>:<id>` holding the record name.
//! The blocking path uses a dedicated `redis::Connection`, the native path a
//! multiplexed async connection. Both see the same keyspace.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::info;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Commands, Connection, RedisError};
use tokio_stream::StreamExt;

use super::{AsyncBackend, BlockingBackend, Record};
use crate::conf::RedisConfig;
use crate::core::BenchError;

const NAME: &str = "redis";

/// Keys per MGET/DEL round trip while draining a scan.
const CHUNK_SIZE: usize = 1000;

fn redis_err(err: RedisError) -> BenchError {
    BenchError::backend(NAME, err.to_string())
}

pub struct RedisBackend {
    namespace: String,
    blocking: Mutex<Connection>,
    multiplexed: MultiplexedConnection,
}

impl RedisBackend {
    pub async fn connect(config: &RedisConfig) -> Result<Self, BenchError> {
        let client = redis::Client::open(config.url.as_str()).map_err(redis_err)?;
        let blocking = client
            .get_connection_with_timeout(config.connect_timeout)
            .map_err(redis_err)?;
        let multiplexed = tokio::time::timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| BenchError::backend(NAME, format!("connecting to {} timed out", config.url)))?
        .map_err(redis_err)?;

        info!("connected to redis at {}", config.url);
        Ok(Self {
            namespace: config.namespace.clone(),
            blocking: Mutex::new(blocking),
            multiplexed,
        })
    }

    fn key(&self, id: i64) -> String {
        format!("{}:{}", self.namespace, id)
    }

    fn pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }

    fn pairs(&self, records: &[Record]) -> Vec<(String, String)> {
        records
            .iter()
            .map(|r| (self.key(r.id), r.name.clone()))
            .collect()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, BenchError> {
        self.blocking
            .lock()
            .map_err(|e| BenchError::backend(NAME, format!("poisoned lock: {e}")))
    }
}

/// SCAN may return a key more than once while the keyspace is rehashing.
fn unique_keys(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// MSETNX is all-or-nothing: it writes nothing when any key already exists.
fn check_inserted(inserted: bool, count: usize) -> Result<usize, BenchError> {
    if inserted {
        Ok(count)
    } else {
        Err(BenchError::backend(
            NAME,
            "bulk insert rejected: one or more keys already exist",
        ))
    }
}

impl BlockingBackend for RedisBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn setup(&self) -> Result<(), BenchError> {
        let mut conn = self.conn()?;
        redis::cmd("PING")
            .query::<String>(&mut *conn)
            .map_err(redis_err)?;
        Ok(())
    }

    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let inserted: bool = redis::cmd("MSETNX")
            .arg(self.pairs(records))
            .query(&mut *conn)
            .map_err(redis_err)?;
        check_inserted(inserted, records.len())
    }

    fn scan_all(&self) -> Result<usize, BenchError> {
        let mut conn = self.conn()?;
        let keys = unique_keys(
            conn.scan_match::<_, String>(self.pattern())
                .map_err(redis_err)?
                .collect(),
        );

        let mut count = 0;
        for chunk in keys.chunks(CHUNK_SIZE) {
            let values: Vec<Option<String>> = conn.mget(chunk).map_err(redis_err)?;
            count += values.iter().flatten().count();
        }
        Ok(count)
    }

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        let mut conn = self.conn()?;
        let name: Option<String> = conn.get(self.key(key)).map_err(redis_err)?;
        Ok(name.map(|name| Record { id: key, name }))
    }

    fn bulk_delete(&self) -> Result<(), BenchError> {
        let mut conn = self.conn()?;
        let keys = unique_keys(
            conn.scan_match::<_, String>(self.pattern())
                .map_err(redis_err)?
                .collect(),
        );
        for chunk in keys.chunks(CHUNK_SIZE) {
            conn.del::<_, ()>(chunk).map_err(redis_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl AsyncBackend for RedisBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = self.multiplexed.clone();
        let inserted: bool = redis::cmd("MSETNX")
            .arg(self.pairs(records))
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;
        check_inserted(inserted, records.len())
    }

    async fn scan_all(&self) -> Result<usize, BenchError> {
        let mut conn = self.multiplexed.clone();
        let scanned: Vec<String> = conn
            .scan_match::<_, String>(self.pattern())
            .await
            .map_err(redis_err)?
            .collect()
            .await;
        let keys = unique_keys(scanned);

        let mut count = 0;
        for chunk in keys.chunks(CHUNK_SIZE) {
            let values: Vec<Option<String>> = conn.mget(chunk).await.map_err(redis_err)?;
            count += values.iter().flatten().count();
        }
        Ok(count)
    }

    async fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        let mut conn = self.multiplexed.clone();
        let name: Option<String> = conn.get(self.key(key)).await.map_err(redis_err)?;
        Ok(name.map(|name| Record { id: key, name }))
    }

    async fn bulk_delete(&self) -> Result<(), BenchError> {
        let mut conn = self.multiplexed.clone();
        let scanned: Vec<String> = conn
            .scan_match::<_, String>(self.pattern())
            .await
            .map_err(redis_err)?
            .collect()
            .await;
        let keys = unique_keys(scanned);
        for chunk in keys.chunks(CHUNK_SIZE) {
            conn.del::<_, ()>(chunk).await.map_err(redis_err)?;
        }
        Ok(())
    }
}
