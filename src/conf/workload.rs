use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    #[serde(default = "WorkloadConfig::default_dataset_size")]
    pub dataset_size: usize,
    #[serde(default = "WorkloadConfig::default_lookup_key")]
    pub lookup_key: i64,
}

impl WorkloadConfig {
    fn default_dataset_size() -> usize {
        10_000
    }

    fn default_lookup_key() -> i64 {
        5555
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            dataset_size: Self::default_dataset_size(),
            lookup_key: Self::default_lookup_key(),
        }
    }
}
