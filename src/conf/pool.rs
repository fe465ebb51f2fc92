use serde::{Deserialize, Serialize};

/// Sizing of the worker pool used by the offload strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    #[serde(default = "PoolConfig::default_max_workers")]
    pub max_workers: usize,
}

impl PoolConfig {
    fn default_max_workers() -> usize {
        8
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: Self::default_max_workers(),
        }
    }
}
