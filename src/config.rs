//! Bridge configuration.
//!
//! Read from `config.toml` in the data directory when present, with code
//! defaults for everything else. The endpoint URL points at the review
//! application's local API; timeouts keep a hung endpoint from stalling a
//! submission.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Local API endpoint of the review application
    pub endpoint_url: String,
    /// Total request timeout for one delivery attempt
    pub delivery_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Backoff unit: an entry waits `attempts * base_delay` between retries
    pub retry_base_delay_secs: u64,
    /// Transient retries before a queued card is marked failed
    pub max_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:8765".to_string(),
            delivery_timeout_secs: 3,
            connect_timeout_secs: 2,
            retry_base_delay_secs: 30,
            max_attempts: 8,
        }
    }
}

impl BridgeConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, falling back to defaults
    /// when the file does not exist
    pub fn load_or_default(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_when_no_file_exists() {
        let dir = TempDir::new().unwrap();
        let config = BridgeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.endpoint_url, "http://localhost:8765");
        assert_eq!(config.max_attempts, 8);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "endpointUrl = \"http://localhost:9999\"\nmaxAttempts = 3\n",
        )
        .unwrap();

        let config = BridgeConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.endpoint_url, "http://localhost:9999");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_delay_secs, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "endpointUrl = [nope").unwrap();
        assert!(BridgeConfig::load_or_default(dir.path()).is_err());
    }
}
