//! Application configuration management.
//!
//! This module handles loading the sync configuration: the report
//! server address, the data directory, and the refresh timing knobs.
//!
//! Configuration is stored at `~/.config/caratsync/config.json`. Every field
//! is optional in the file; missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::cache::CacheOptions;
use crate::scheduler::RefreshSettings;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "caratsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `server_url`
pub const SERVER_URL_ENV: &str = "CARATSYNC_SERVER_URL";

/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "CARATSYNC_DATA_DIR";

/// Total refresh tries per tick.
const DEFAULT_FETCH_ATTEMPTS: u32 = 2;

/// Re-check delay while the network is still coming up.
const DEFAULT_WIFI_WAIT_SECS: u64 = 10;

/// Delay between regular refresh ticks.
const DEFAULT_FRESHNESS_TIMEOUT_SECS: u64 = 30 * 60;

/// Idle time before a cached value becomes reclaimable.
const DEFAULT_CACHE_IDLE_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the report service. Without it, the scheduler only keeps
    /// presentation state current and never fetches.
    pub server_url: Option<String>,
    /// Device identifier sent with every request.
    pub device_id: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub fetch_attempts: u32,
    pub wifi_wait_secs: u64,
    pub freshness_timeout_secs: u64,
    pub cache_idle_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            device_id: None,
            data_dir: None,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            wifi_wait_secs: DEFAULT_WIFI_WAIT_SECS,
            freshness_timeout_secs: DEFAULT_FRESHNESS_TIMEOUT_SECS,
            cache_idle_secs: DEFAULT_CACHE_IDLE_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SyncConfig {
    /// Load from the default location, falling back to defaults if there is
    /// no file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(SERVER_URL_ENV).ok(),
            std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        );
    }

    fn apply_overrides(&mut self, server_url: Option<String>, data_dir: Option<PathBuf>) {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            self.server_url = Some(url);
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
    }

    /// Directory holding the cached entity files.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            fetch_attempts: self.fetch_attempts.max(1),
            wifi_wait: Duration::from_secs(self.wifi_wait_secs),
            freshness_timeout: Duration::from_secs(self.freshness_timeout_secs),
        }
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            idle_ttl: Duration::from_secs(self.cache_idle_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        let settings = config.refresh_settings();
        assert_eq!(settings.fetch_attempts, 2);
        assert_eq!(settings.wifi_wait, Duration::from_secs(10));
        assert_eq!(settings.freshness_timeout, Duration::from_secs(1800));
        assert_eq!(config.cache_options().idle_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = scratch_dir().join("absent.json");
        assert_eq!(SyncConfig::load_from(&path).expect("load"), SyncConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch_dir().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"server_url": "https://carat.example.org", "wifi_wait_secs": 3}"#)
            .expect("write config");

        let config = SyncConfig::load_from(&path).expect("load");
        assert_eq!(config.server_url.as_deref(), Some("https://carat.example.org"));
        assert_eq!(config.wifi_wait_secs, 3);
        assert_eq!(config.fetch_attempts, DEFAULT_FETCH_ATTEMPTS);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = scratch_dir().join(CONFIG_FILE);
        std::fs::write(&path, "server_url = nope").expect("write config");
        assert!(SyncConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_full_file_round_trip() {
        let path = scratch_dir().join(CONFIG_FILE);
        let config = SyncConfig {
            device_id: Some("device-1".to_string()),
            freshness_timeout_secs: 60,
            ..Default::default()
        };
        let contents = serde_json::to_string_pretty(&config).expect("serialize config");
        std::fs::write(&path, contents).expect("write config");
        assert_eq!(SyncConfig::load_from(&path).expect("load"), config);
    }

    #[test]
    fn test_overrides() {
        let mut config = SyncConfig::default();
        config.apply_overrides(Some("  ".to_string()), None);
        assert!(config.server_url.is_none());

        config.apply_overrides(Some("http://localhost:8080".to_string()), Some(PathBuf::from("/tmp/carat")));
        assert_eq!(config.server_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.data_dir().expect("data dir"), PathBuf::from("/tmp/carat"));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let config = SyncConfig {
            fetch_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.refresh_settings().fetch_attempts, 1);
    }
}
