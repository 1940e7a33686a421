//! Configuration management with YAML support
//!
//! This is the tool configuration (where notes live, which endpoint to call).
//! User-editable settings such as the API key live in the store's
//! `settings.json`, see [`crate::settings`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::{ClientOptions, DEFAULT_BASE_URL};
use crate::settings::Settings;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Interpretation API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable consulted when settings carry no API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
}

// Default value functions
fn default_storage_path() -> String {
    "~/.waypoint".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./waypoint.yaml (current directory)
    /// 3. <config dir>/waypoint/waypoint.yaml
    pub fn load(path: &str) -> Result<Self> {
        let mut search_paths = vec![
            PathBuf::from(shellexpand::tilde(path).to_string()),
            PathBuf::from("waypoint.yaml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("waypoint").join("waypoint.yaml"));
        }

        for search_path in &search_paths {
            if search_path.exists() {
                let content = std::fs::read_to_string(search_path)
                    .with_context(|| format!("Failed to read {}", search_path.display()))?;
                let config: Config = serde_yaml::from_str(&content)
                    .with_context(|| format!("Invalid config file {}", search_path.display()))?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the storage directory, expanding ~ to home directory
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.storage.path).to_string())
    }

    /// Resolve client options: the settings' key wins over the environment
    pub fn client_options(&self, settings: &Settings) -> ClientOptions {
        let api_key = settings.api_key.clone().or_else(|| {
            self.api
                .api_key_env
                .as_ref()
                .and_then(|name| std::env::var(name).ok())
                .filter(|key| !key.trim().is_empty())
        });
        ClientOptions {
            api_key,
            model: settings.model.clone(),
            base_url: self.api.base_url.clone(),
        }
    }
}
