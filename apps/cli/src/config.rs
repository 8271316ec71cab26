//! CLI configuration
//!
//! Sources are layered in order: built-in defaults, an optional TOML file,
//! then `QUARRY__*` environment variables (`.env` is loaded first).

use std::path::Path;

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use quarry_query::QueryConfig;
use serde::Deserialize;

/// File read when no `--config` path is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "quarry";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level applied to the quarry crates unless `RUST_LOG` is set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// An explicit `path` must exist; the default `quarry.toml` may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Self::from_builder(
            config::Config::builder().add_source(file).add_source(
                Environment::with_prefix("QUARRY")
                    .separator("__")
                    .try_parsing(true),
            ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.query.validate()?;

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(format!("logging.level: unknown level '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use quarry_query::FailurePolicy;

    fn from_toml(source: &str) -> Config {
        Config::from_builder(
            config::Config::builder().add_source(File::from_str(source, FileFormat::Toml)),
        )
        .unwrap()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = from_toml("");
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = from_toml(
            r#"
            [query]
            failure_policy = "drop"
            max_include_depth = 3

            [logging]
            json = true
            "#,
        );
        assert_eq!(config.query.failure_policy, FailurePolicy::Drop);
        assert_eq!(config.query.max_include_depth, 3);
        assert_eq!(config.query.filter_marker, "filter");
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = from_toml("[logging]\nlevel = \"loud\"");
        assert!(config.validate().unwrap_err().contains("loud"));

        let config = from_toml("[query]\nmax_filters = 0");
        assert!(config.validate().is_err());
    }
}
