//! CLI module for the ETF discovery backend
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `seed-index`: create the ETF index and load the sample ETFs
//! - `check-model`: verify the extraction model is installed

pub mod check;
pub mod seed;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// ETF discovery backend - semantic ETF search
#[derive(Parser)]
#[command(name = "etf-discovery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Create the search index if missing and index the sample ETFs
    SeedIndex,

    /// Check that the configured language model is available
    CheckModel,
}

/// Loads `.env` and the layered configuration, then starts logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Invalid configuration, using defaults");
    }

    config
}
