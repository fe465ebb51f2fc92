//! MongoDB adapter.
//!
//! Records live in one collection as `{ _id: <id>, name: <name> }`. The
//! blocking path uses the driver's `sync` client, the native path the async
//! client; both are opened from the same options and see the same collection.

use async_trait::async_trait;
use log::info;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Collection, IndexModel, sync};
use serde::{Deserialize, Serialize};

use super::{AsyncBackend, BlockingBackend, Record, recover_setup_conflict};
use crate::conf::MongoConfig;
use crate::core::BenchError;

const NAME: &str = "mongo";

/// Server error code for `create` on a collection that already exists.
const NAMESPACE_EXISTS: i32 = 48;

fn mongo_err(err: MongoError) -> BenchError {
    BenchError::backend(NAME, err.to_string())
}

fn is_namespace_exists(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command) if command.code == NAMESPACE_EXISTS)
}

/// The sync client drives the driver's own runtime with `block_on`, which
/// panics on a thread that is already inside a tokio runtime. The caller
/// still blocks until `f` returns.
fn off_runtime<T: Send>(f: impl FnOnce() -> T + Send) -> T {
    std::thread::scope(|scope| match scope.spawn(f).join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MongoDoc {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
}

impl From<&Record> for MongoDoc {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

impl From<MongoDoc> for Record {
    fn from(doc: MongoDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
        }
    }
}

pub struct MongoBackend {
    collection_name: String,
    blocking_db: sync::Database,
    blocking: sync::Collection<MongoDoc>,
    native: Collection<MongoDoc>,
}

impl MongoBackend {
    pub async fn connect(config: &MongoConfig) -> Result<Self, BenchError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(mongo_err)?;
        options.app_name = Some(String::from("crudbench"));
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let native_client = mongodb::Client::with_options(options.clone()).map_err(mongo_err)?;
        native_client
            .database(&config.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(mongo_err)?;
        let blocking_client =
            off_runtime(|| sync::Client::with_options(options)).map_err(mongo_err)?;

        let blocking_db = blocking_client.database(&config.database);
        info!(
            "connected to mongodb at {}, collection {}.{}",
            config.uri, config.database, config.collection
        );
        Ok(Self {
            collection_name: config.collection.clone(),
            blocking: blocking_db.collection(&config.collection),
            blocking_db,
            native: native_client
                .database(&config.database)
                .collection(&config.collection),
        })
    }

    fn create_collection(&self) -> Result<(), BenchError> {
        match self.blocking_db.create_collection(&self.collection_name).run() {
            Ok(()) => {
                info!("{NAME}: created collection {}", self.collection_name);
                Ok(())
            }
            Err(e) if is_namespace_exists(&e) => Err(BenchError::SetupConflict(format!(
                "collection {}",
                self.collection_name
            ))),
            Err(e) => Err(mongo_err(e)),
        }
    }
}

impl BlockingBackend for MongoBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    /// `_id` is always indexed; the secondary index on `name` is a no-op
    /// when an identical one exists.
    fn setup(&self) -> Result<(), BenchError> {
        off_runtime(|| {
            recover_setup_conflict(NAME, self.create_collection())?;
            let index = IndexModel::builder().keys(doc! { "name": 1 }).build();
            self.blocking.create_index(index).run().map_err(mongo_err)?;
            Ok(())
        })
    }

    /// Ordered insert: the batch stops at the first duplicate `_id`, keeping
    /// the documents before it.
    fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        let docs: Vec<MongoDoc> = records.iter().map(MongoDoc::from).collect();
        off_runtime(|| {
            let result = self.blocking.insert_many(&docs).run().map_err(mongo_err)?;
            Ok(result.inserted_ids.len())
        })
    }

    fn scan_all(&self) -> Result<usize, BenchError> {
        off_runtime(|| {
            let cursor = self.blocking.find(doc! {}).run().map_err(mongo_err)?;
            let mut count = 0;
            for doc in cursor {
                doc.map_err(mongo_err)?;
                count += 1;
            }
            Ok(count)
        })
    }

    fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        off_runtime(|| {
            self.blocking
                .find_one(doc! { "_id": key })
                .run()
                .map(|found| found.map(Record::from))
                .map_err(mongo_err)
        })
    }

    fn bulk_delete(&self) -> Result<(), BenchError> {
        off_runtime(|| {
            self.blocking
                .delete_many(doc! {})
                .run()
                .map_err(mongo_err)?;
            Ok(())
        })
    }
}

#[async_trait]
impl AsyncBackend for MongoBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn bulk_insert(&self, records: &[Record]) -> Result<usize, BenchError> {
        if records.is_empty() {
            return Ok(0);
        }
        let docs: Vec<MongoDoc> = records.iter().map(MongoDoc::from).collect();
        let result = self.native.insert_many(&docs).await.map_err(mongo_err)?;
        Ok(result.inserted_ids.len())
    }

    async fn scan_all(&self) -> Result<usize, BenchError> {
        let mut cursor = self.native.find(doc! {}).await.map_err(mongo_err)?;
        let mut count = 0;
        while cursor.advance().await.map_err(mongo_err)? {
            cursor.deserialize_current().map_err(mongo_err)?;
            count += 1;
        }
        Ok(count)
    }

    async fn point_lookup(&self, key: i64) -> Result<Option<Record>, BenchError> {
        self.native
            .find_one(doc! { "_id": key })
            .await
            .map(|found| found.map(Record::from))
            .map_err(mongo_err)
    }

    async fn bulk_delete(&self) -> Result<(), BenchError> {
        self.native.delete_many(doc! {}).await.map_err(mongo_err)?;
        Ok(())
    }
}
