//! Application configuration storage
//!
//! Handles persistent storage of the model choice and API settings.

use std::path::{Path, PathBuf};

use generation::GenerationConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;
use viz_engine::constants::files as engine_files;

use crate::constants::files;

/// Full application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Model name, e.g. "gemini-2.5-flash"
    #[serde(default)]
    pub model: Option<String>,
    /// API root for self-hosted or proxied endpoints
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key; the environment is used when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// History file location, defaults to `history.json` in the data dir
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from disk
    pub async fn load(app_data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = app_data_dir.join(files::CONFIG);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, app_data_dir: &Path) -> Result<(), ConfigError> {
        // Ensure directory exists
        fs::create_dir_all(app_data_dir).await?;

        let config_path = app_data_dir.join(files::CONFIG);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents).await?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Apply the stored values on top of `base`
    pub fn overlay(&self, base: GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            api_key: self.api_key.clone().or(base.api_key),
            base_url: self.base_url.clone().unwrap_or(base.base_url),
            model: self.model.clone().unwrap_or(base.model),
            temperature: self.temperature.unwrap_or(base.temperature),
        }
    }

    pub fn history_path(&self, app_data_dir: &Path) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| app_data_dir.join(engine_files::HISTORY))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
