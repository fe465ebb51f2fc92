mod backends;
mod config;
mod pool;
mod server;
mod workload;

pub use backends::{BackendsConfig, MongoConfig, RedisConfig, SqliteConfig};
pub use self::config::Config;
pub use pool::PoolConfig;
pub use server::ServerConfig;
pub use workload::WorkloadConfig;
