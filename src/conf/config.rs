use crate::{
    conf::{BackendsConfig, PoolConfig, ServerConfig, WorkloadConfig},
    core::BenchError::{self, ConfigParsingError},
};
use config::{Config as CConfig, ConfigBuilder, Environment, builder::DefaultState};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "CRUDBENCH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, BenchError> {
        let builder = CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml));
        Self::build(builder)
    }

    /// Layers the optional TOML file with `CRUDBENCH_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Config, BenchError> {
        let mut builder = CConfig::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Config, BenchError> {
        let config = builder
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))?;
        Ok(config)
    }
}
