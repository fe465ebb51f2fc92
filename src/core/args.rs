use clap::Parser;
use log::kv::{ToValue, Value};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub struct CliArgs {
    #[arg(short, long)]
    pub config: Option<String>,
    /// Overrides `server.port` from the config file.
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ToValue for CliArgs {
    fn to_value(&self) -> Value<'_> {
        Value::from_debug(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = CliArgs::parse_from(["self", "--config", "foo", "--port", "9000"]);
        assert_eq!(
            args,
            CliArgs {
                config: Some("foo".to_string()),
                port: Some(9000),
            }
        );
    }

    #[test]
    fn test_args_defaults() {
        let args = CliArgs::parse_from(["self"]);
        assert_eq!(
            args,
            CliArgs {
                config: None,
                port: None,
            }
        );
    }
}
