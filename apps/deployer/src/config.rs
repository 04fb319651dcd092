//! Deployer configuration.
//!
//! Read from `~/.config/staticship/config.json`, then overridden by the
//! `STATICSHIP_API_URL` and `STATICSHIP_API_KEY` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const API_URL_ENV: &str = "STATICSHIP_API_URL";
const API_KEY_ENV: &str = "STATICSHIP_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerConfig {
    pub api_url: String,
    pub api_key: String,
    /// Reported to the platform as the calling tool.
    pub via: Option<String>,
    pub spa_detect: bool,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            api_url: staticship_api::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            via: Some("cli".into()),
            spa_detect: true,
        }
    }
}

impl DeployerConfig {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads `path`. A missing file yields defaults; a malformed one logs a
    /// warning and yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = get(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
    }
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("staticship").join("config.json"))
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}
