//! jd CLI Binary
//!
//! Command-line interface for the Johnny Decimal filing system.

use anyhow::Context;
use clap::Parser;
use johnnydecimal::cli::{map_error, Cli, RunContext};
use johnnydecimal::config::{ConfigLoader, JdConfig};
use johnnydecimal::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("warning: {:#}; using defaults", e);
        JdConfig::default()
    });
    let logging_config = build_logging_config(&cli, &config);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }
    debug!("jd starting");

    let context = match RunContext::new(cli.root.clone(), &config) {
        Ok(context) => context,
        Err(e) => {
            error!("error resolving filing root: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            let output = output.trim_end();
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<JdConfig> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => ConfigLoader::load().context("loading configuration"),
    }
}

/// Build logging configuration from CLI args, environment, and config
/// file. Precedence: CLI flags over config file over defaults.
fn build_logging_config(cli: &Cli, config: &JdConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        logging.file = file.clone();
        logging.output = "file".to_string();
    }
    logging
}
