//! quizbuzz - buzzer quiz host console.
//!
//! ```text
//! quizbuzz [--config quizbuzz.toml] play [--mock] [--port /dev/ttyUSB0]
//! quizbuzz questions list
//! quizbuzz questions set 1 --text "2 + 2?" --answer 3 --answer 4 --correct 2 --enable
//! quizbuzz questions reset
//! ```
//!
//! Logs go to stderr and are filtered by `--log-level` or `RUST_LOG`.

mod cli;
mod config;
mod console;
mod questions;
mod render;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;

const DEFAULT_LOG_FILTER: &str = "info";

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER)),
    }
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    debug!(?config, "configuration");

    match cli.command {
        Some(Commands::Questions { action }) => questions::run(&config, action).await,
        Some(Commands::Play(args)) => {
            config.apply_play(&args);
            console::run(config).await
        }
        None => console::run(config).await,
    }
}
