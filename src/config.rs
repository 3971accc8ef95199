//! Configuration management
//!
//! Manages CLI configuration: Gemini API settings and storage locations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Storage location overrides
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. Usually left unset in the file and supplied via GEMINI_API_KEY.
    pub api_key: Option<String>,
    /// Model used for all generation and grading calls
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

/// Storage location overrides. When unset, the platform data directory is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the profile JSON, vocabulary database and token ledger
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Directory for daily task transcripts
    #[serde(default)]
    pub tasks_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating the default file if absent
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent().context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve the Gemini API key: GEMINI_API_KEY env first, config file second
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.gemini
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("Gemini API key not set. Export GEMINI_API_KEY or add it to the config file.")
    }

    /// Directory holding the profile JSON, vocabulary database and token ledger
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }

    /// Directory holding daily task transcripts
    pub fn tasks_dir(&self) -> Result<PathBuf> {
        match &self.storage.tasks_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("tasks")),
        }
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "lingotutor", "lingotutor")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the default data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "lingotutor", "lingotutor")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}
