//! Logging System
//!
//! Structured logging via the `tracing` crate. Log output defaults to
//! stderr so command output on stdout stays machine-consumable.

use crate::error::OpError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format, terminal outputs only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(".jd/jd.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order (highest to lowest): `JD_LOG`/`JD_LOG_FORMAT`/
/// `JD_LOG_OUTPUT` environment variables, then the passed configuration,
/// then defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), OpError> {
    let filter = build_env_filter(config);
    let format = determine_format(config)?;
    let output = determine_output(config)?;

    let base = Registry::default().with(filter);
    let use_color = config.map(|c| c.color).unwrap_or(true);

    let file_writer = |config: Option<&LoggingConfig>| -> Result<std::fs::File, OpError> {
        let log_file = config
            .map(|c| c.file.clone())
            .unwrap_or_else(default_log_file);
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OpError::Config(format!("failed to create log directory: {}", e)))?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| OpError::Config(format!("failed to open log file {:?}: {}", log_file, e)))
    };

    match (format.as_str(), output.as_str()) {
        ("json", "file") => {
            let writer = file_writer(config)?;
            base.with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .init();
        }
        ("json", "stdout") => {
            base.with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stdout),
            )
            .init();
        }
        ("json", _) => {
            base.with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .init();
        }
        (_, "file") => {
            let writer = file_writer(config)?;
            base.with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init();
        }
        (_, "stdout") => {
            base.with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(std::io::stdout),
            )
            .init();
        }
        _ => {
            base.with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(std::io::stderr),
            )
            .init();
        }
    }

    Ok(())
}

fn build_env_filter(config: Option<&LoggingConfig>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env("JD_LOG") {
        return filter;
    }
    let level = config.map(|c| c.level.as_str()).unwrap_or("warn");
    EnvFilter::new(level)
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<String, OpError> {
    if let Ok(format) = std::env::var("JD_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }
    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(OpError::Config(format!(
            "invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<String, OpError> {
    if let Ok(output) = std::env::var("JD_LOG_OUTPUT") {
        return validate_output(&output);
    }
    let output = config.map(|c| c.output.as_str()).unwrap_or("stderr");
    validate_output(output)
}

fn validate_output(output: &str) -> Result<String, OpError> {
    match output {
        "stdout" | "stderr" | "file" => Ok(output.to_string()),
        _ => Err(OpError::Config(format!(
            "invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            output
        ))),
    }
}
