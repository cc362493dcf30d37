//! Application configuration.
//!
//! Layered: built-in defaults, then an optional `config.toml` in the
//! user's config directory, then `JD_*` environment overrides
//! (`JD_ROOT`, `JD_LOGGING__LEVEL`, ...). This is app-level wiring only;
//! per-directory behavior lives in the policy engine.

use crate::error::OpError;
use crate::logging::LoggingConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JdConfig {
    /// Filing system root override. When unset, the root is discovered
    /// from the Documents directory or the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Loads configuration from defaults, file, and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default locations.
    pub fn load() -> Result<JdConfig, OpError> {
        let mut builder = builder_with_defaults().map_err(config_error)?;
        if let Some(path) = default_config_file() {
            if path.exists() {
                builder = builder.add_source(File::from(path));
            }
        }
        builder
            .add_source(Environment::with_prefix("JD").separator("__"))
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)
    }

    /// Load configuration from an explicit file, still honoring
    /// environment overrides.
    pub fn load_from_file(path: &Path) -> Result<JdConfig, OpError> {
        builder_with_defaults()
            .map_err(config_error)?
            .add_source(File::from(path.to_path_buf()))
            .add_source(Environment::with_prefix("JD").separator("__"))
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)
    }
}

/// Create a Config builder with baseline defaults applied.
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

fn default_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "jd").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn config_error(err: ConfigError) -> OpError {
    OpError::Config(err.to_string())
}
