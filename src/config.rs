//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the backend base URL and the last signed-in email (pre-filled on
//! the login screen).
//!
//! Configuration is stored at `~/.config/menumate/config.json`. The base URL
//! can be overridden with the `MENUMATE_API_URL` environment variable (a
//! `.env` file is honored), which staging builds and the test harness use.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "menumate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production backend
const DEFAULT_API_BASE_URL: &str = "https://api.menumate.app";

/// Environment override for the backend base URL
const API_URL_ENV: &str = "MENUMATE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        // Pick up a .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
