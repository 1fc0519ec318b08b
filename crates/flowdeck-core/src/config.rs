//! Application configuration management.
//!
//! Configuration is stored at `~/.config/flowdeck/config.json`. Every key is
//! optional; environment variables take precedence over the file, and
//! built-in fallbacks fill whatever is left.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, FileCredentialStore, KeyringCredentialStore};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "flowdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "FLOWDECK_API_URL";

/// Environment variable overriding the workflow platform URL
pub const PLATFORM_URL_ENV: &str = "FLOWDECK_PLATFORM_URL";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_PLATFORM_URL: &str = "http://localhost:3000";

/// Delay between a successful create and opening its editor.
const DEFAULT_OPEN_DELAY_MS: u64 = 500;

/// Where the session token is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub platform_url: Option<String>,
    #[serde(default)]
    pub credential_backend: CredentialBackend,
    pub request_timeout_secs: Option<u64>,
    pub open_delay_ms: Option<u64>,
}

/// Effective settings after applying environment overrides and fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub platform_url: String,
    pub credential_backend: CredentialBackend,
    pub request_timeout: Option<Duration>,
    pub open_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Settings {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using `env` for variable lookups.
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Settings {
        let pick = |var: &str, file: &Option<String>, fallback: &str| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        Settings {
            api_base_url: pick(API_URL_ENV, &self.api_base_url, DEFAULT_API_URL),
            platform_url: pick(PLATFORM_URL_ENV, &self.platform_url, DEFAULT_PLATFORM_URL),
            credential_backend: self.credential_backend,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            open_delay: Duration::from_millis(self.open_delay_ms.unwrap_or(DEFAULT_OPEN_DELAY_MS)),
        }
    }
}

impl Settings {
    /// Open the configured credential store.
    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        self.credential_store_in(Config::cache_dir().ok())
    }

    /// Open the configured credential store, keeping file credentials in
    /// `cache_dir`. The file backend refuses to run without one.
    pub fn credential_store_in(&self, cache_dir: Option<PathBuf>) -> Result<Arc<dyn CredentialStore>> {
        match self.credential_backend {
            CredentialBackend::File => {
                let dir = cache_dir.ok_or_else(|| {
                    anyhow::anyhow!(
                        "Could not find a cache directory for credentials; set credential_backend to \"keyring\""
                    )
                })?;
                Ok(Arc::new(FileCredentialStore::new(&dir)))
            }
            CredentialBackend::Keyring => Ok(Arc::new(KeyringCredentialStore::new())),
        }
    }
}
