//! Application configuration.
//!
//! Everything has a default, so the console runs without a file. A TOML
//! file given with `--config` may set any subset:
//!
//! ```toml
//! mock = false
//!
//! [game]
//! roster_size = 4
//! poll_interval_ms = 100
//! advance = "host_paced"
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! unit_id = 1
//! base_address = 10
//!
//! [store]
//! path = "questions.json"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quizbuzz_engine::GameConfig;
use quizbuzz_hardware::SerialConfig;
use quizbuzz_storage::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::{Cli, PlayArgs};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Drive a simulated panel from the console instead of the serial port
    pub mock: bool,

    pub game: GameConfig,

    pub serial: SerialConfig,

    pub store: StoreConfig,
}

impl AppConfig {
    /// Load from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.game.validate()?;
        Ok(config)
    }

    /// Apply the global command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.questions {
            self.store.path = path.clone();
        }
    }

    /// Apply the `play` overrides.
    pub fn apply_play(&mut self, args: &PlayArgs) {
        if let Some(port) = &args.port {
            self.serial.port = port.clone();
        }
        if args.mock {
            self.mock = true;
        }
    }

    /// Serial settings sized to the roster.
    pub fn serial_for_roster(&self) -> SerialConfig {
        self.serial.clone().input_count(self.game.roster_size)
    }
}
