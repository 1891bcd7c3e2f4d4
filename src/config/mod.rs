//! # Configuration
//!
//! TOML configuration for the game host and the command line tool.
//!
//! ## Sections
//!
//! - [`GameConfig`] - world data file and per-game defaults
//! - [`StorageConfig`] - where saved games live
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use globetrot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("globetrot.toml").await?;
//!     println!("World data: {}", config.game.data_file);
//!     println!("Saves: {}", config.save_dir().display());
//!     Ok(())
//! }
//! ```
//!
//! ## File Format
//!
//! ```toml
//! [game]
//! data_file = "data.json"
//! goal = 5
//! allow_cheats = false
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "globetrot.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Static world JSON.
    pub data_file: String,
    /// Souvenirs needed to win. Unset keeps the data file's goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<usize>,
    /// Enables the `cheat` command. Debug only.
    #[serde(default)]
    pub allow_cheats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Directory of the saved games database.
    pub fn save_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("saves")
    }

    /// Log level from config, falling back to info for unknown names.
    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig {
                data_file: "data.json".to_string(),
                goal: Some(5),
                allow_cheats: false,
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("globetrot.log".to_string()),
            },
        }
    }
}
