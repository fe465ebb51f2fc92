use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SqliteConfig {
    #[serde(default = "SqliteConfig::default_path")]
    pub path: PathBuf,
}

impl SqliteConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("bench.sqlite3")
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    #[serde(default = "RedisConfig::default_url")]
    pub url: String,
    /// Key prefix; records are stored as `<namespace>:<id>`.
    #[serde(default = "RedisConfig::default_namespace")]
    pub namespace: String,
    #[serde(
        with = "humantime_serde",
        default = "RedisConfig::default_connect_timeout"
    )]
    pub connect_timeout: Duration,
}

impl RedisConfig {
    fn default_url() -> String {
        String::from("redis://127.0.0.1:6379")
    }

    fn default_namespace() -> String {
        String::from("bench")
    }

    fn default_connect_timeout() -> Duration {
        Duration::from_secs(5)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            namespace: Self::default_namespace(),
            connect_timeout: Self::default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MongoConfig {
    #[serde(default = "MongoConfig::default_uri")]
    pub uri: String,
    #[serde(default = "MongoConfig::default_database")]
    pub database: String,
    #[serde(default = "MongoConfig::default_collection")]
    pub collection: String,
    /// Bounds both the TCP connect and server selection.
    #[serde(
        with = "humantime_serde",
        default = "MongoConfig::default_connect_timeout"
    )]
    pub connect_timeout: Duration,
}

impl MongoConfig {
    fn default_uri() -> String {
        String::from("mongodb://127.0.0.1:27017")
    }

    fn default_database() -> String {
        String::from("bench")
    }

    fn default_collection() -> String {
        String::from("bench")
    }

    fn default_connect_timeout() -> Duration {
        Duration::from_secs(5)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: Self::default_uri(),
            database: Self::default_database(),
            collection: Self::default_collection(),
            connect_timeout: Self::default_connect_timeout(),
        }
    }
}

/// Which backend technologies to open at start-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackendsConfig {
    #[serde(default = "BackendsConfig::default_memory")]
    pub memory: bool,
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub mongo: Option<MongoConfig>,
}

impl BackendsConfig {
    fn default_memory() -> bool {
        true
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            memory: Self::default_memory(),
            sqlite: None,
            redis: None,
            mongo: None,
        }
    }
}
