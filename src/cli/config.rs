// ABOUTME: Configuration management for the conductor application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = serde_yaml::from_str(&contents)?;
            config.merge_env()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.merge_env()?;
            Ok(config)
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".conductor").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        let possible_paths = [
            PathBuf::from("conductor.yaml"),
            PathBuf::from("conductor.yml"),
            PathBuf::from(".conductor.yaml"),
            PathBuf::from(".conductor.yml"),
        ];

        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        PathBuf::from("conductor.yaml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("CONDUCTOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CONDUCTOR_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(capacity) = std::env::var("CONDUCTOR_HISTORY_CAPACITY") {
            self.history_capacity = capacity.parse()?;
        }

        Ok(())
    }
}
