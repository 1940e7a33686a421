//! User settings persisted in `settings.json`

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_COMMITS: usize = 10;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Keys accepted by `config get/set`
pub const KEYS: [&str; 4] = ["apiKey", "maxCommits", "model", "aiEnabled"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_commits")]
    pub max_commits: usize,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_enabled")]
    pub ai_enabled: bool,
}

fn default_max_commits() -> usize {
    DEFAULT_MAX_COMMITS
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_commits: default_max_commits(),
            model: default_model(),
            ai_enabled: default_enabled(),
        }
    }
}

/// Fields to overwrite; `None` leaves the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub api_key: Option<String>,
    pub max_commits: Option<usize>,
    pub model: Option<String>,
    pub ai_enabled: Option<bool>,
}

impl Settings {
    /// Shallow merge
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(key) = patch.api_key {
            self.api_key = Some(key);
        }
        if let Some(n) = patch.max_commits {
            self.max_commits = n;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(enabled) = patch.ai_enabled {
            self.ai_enabled = enabled;
        }
    }

    /// Display value for a key. The API key is masked unless `reveal` is set.
    pub fn get(&self, key: &str, reveal: bool) -> Result<String, ConfigError> {
        let value = match key {
            "apiKey" => match &self.api_key {
                Some(k) if reveal => k.clone(),
                Some(k) => mask(k),
                None => "(not set)".to_string(),
            },
            "maxCommits" => self.max_commits.to_string(),
            "model" => self.model.clone(),
            "aiEnabled" => self.ai_enabled.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }
}

/// Parse a `config set` pair into a patch, validating the value.
pub fn parse_patch(key: &str, value: &str) -> Result<SettingsPatch, ConfigError> {
    let invalid = |reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    };

    let mut patch = SettingsPatch::default();
    match key {
        "apiKey" => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(invalid("must not be empty"));
            }
            patch.api_key = Some(trimmed.to_string());
        }
        "maxCommits" => {
            let n: i64 = value
                .trim()
                .parse()
                .map_err(|_| invalid("must be a positive integer"))?;
            if n <= 0 {
                return Err(invalid("must be a positive integer"));
            }
            patch.max_commits = Some(n as usize);
        }
        "model" => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(invalid("must not be empty"));
            }
            patch.model = Some(trimmed.to_string());
        }
        "aiEnabled" => {
            patch.ai_enabled = Some(match value.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" => false,
                _ => return Err(invalid("must be true or false")),
            });
        }
        other => return Err(ConfigError::UnknownKey(other.to_string())),
    }
    Ok(patch)
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
