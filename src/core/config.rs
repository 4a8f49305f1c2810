//! Application configuration management
//!
//! Optional file-based defaults for values that rarely change per run
//! (OAuth client id, build program). Everything here is merged with CLI
//! flags into explicit option structs; no global state.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{GitrelError, Result};

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OAuth App client id; falls back to the built-in one
    #[serde(default)]
    pub client_id: Option<String>,

    /// Build program to invoke, e.g. "make"
    #[serde(default)]
    pub build_program: Option<String>,

    /// Build target to run
    #[serde(default)]
    pub build_target: Option<String>,
}

impl Config {
    /// Load configuration from file, or default if none exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("dev", "gitrel", "gitrel")
            .ok_or_else(|| GitrelError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
