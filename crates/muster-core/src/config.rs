use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::MusterError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub hub: HubConfig,
    pub refetch: RefetchConfig,
}

/// Where the dashboard backend lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Re-fetch schedule after an accepted content request. Backends queue
/// requests and apply them asynchronously, so a single immediate poll
/// usually misses the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefetchConfig {
    pub offsets_ms: Vec<u64>,
}

impl RefetchConfig {
    pub fn offsets(&self) -> Vec<Duration> {
        self.offsets_ms.iter().map(|ms| Duration::from_millis(*ms)).collect()
    }
}

impl AppConfig {
    /// Load config: user file (if exists), built-in defaults otherwise.
    pub fn load() -> Result<Self, MusterError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)
                .map_err(|e| MusterError::Config(e.to_string()))?;
            let user: AppConfig =
                toml::from_str(&user_str).map_err(|e| MusterError::Config(e.to_string()))?;
            Ok(user)
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| MusterError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), MusterError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MusterError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "muster")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.hub.base_url, "http://127.0.0.1:3000/api");
        assert!(config.hub.api_key.is_none());
        assert_eq!(config.refetch.offsets_ms, vec![0, 2000, 10000]);
    }

    #[test]
    fn test_offsets_as_durations() {
        let config = AppConfig::default();
        let offsets = config.refetch.offsets();
        assert_eq!(offsets.first(), Some(&Duration::ZERO));
        assert_eq!(offsets.last(), Some(&Duration::from_secs(10)));
    }

    #[test]
    fn test_roundtrip() {
        let mut config = AppConfig::default();
        config.hub.api_key = Some("secret".to_string());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.hub.base_url, config.hub.base_url);
        assert_eq!(deserialized.hub.api_key.as_deref(), Some("secret"));
        assert_eq!(deserialized.refetch.offsets_ms, config.refetch.offsets_ms);
    }
}
