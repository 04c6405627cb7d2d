//! Configuration for the cloud sync service.
//!
//! Sectioned YAML/TOML configuration loaded with the `config` crate.
//! Credentials are part of the config file and are handed to the engine
//! explicitly at construction; there is no ambient credential state.

use crate::error::{CloudSyncError, Result};
use crate::oauth::Credentials;
use config::{Config as ConfigLib, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Telldus Live API endpoint configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://api.telldus.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Reconciliation loop configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    /// Path to the generated tellstick.conf
    pub conf_path: PathBuf,
    /// Seconds between sync cycles
    pub interval_secs: u64,
    /// Process name signaled after a conf rewrite
    pub telldusd_process: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            conf_path: PathBuf::from("/etc/tellstick.conf"),
            interval_secs: 300,
            telldusd_process: "telldusd".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

/// Main service configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub credentials: Credentials,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML or TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Yaml,
        };

        let settings = ConfigLib::builder()
            .add_source(File::from(path).format(format))
            .build()
            .map_err(|e| CloudSyncError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| CloudSyncError::Config(e.to_string()))
    }

    /// Reject configurations that cannot possibly sync.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(CloudSyncError::Config("api.base_url is empty".to_string()));
        }
        if self.sync.interval_secs == 0 {
            return Err(CloudSyncError::Config(
                "sync.interval_secs must be at least 1".to_string(),
            ));
        }

        let missing = [
            ("credentials.public_key", &self.credentials.public_key),
            ("credentials.private_key", &self.credentials.private_key),
            ("credentials.token", &self.credentials.token),
            ("credentials.token_secret", &self.credentials.token_secret),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty());

        if let Some((field, _)) = missing {
            return Err(CloudSyncError::Config(format!("{} is empty", field)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn valid_config() -> Config {
        Config {
            credentials: Credentials {
                public_key: "pub".to_string(),
                private_key: "priv".to_string(),
                token: "tok".to_string(),
                token_secret: "sec".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn defaults_point_at_telldus_live() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.telldus.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.sync.conf_path, PathBuf::from("/etc/tellstick.conf"));
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        let mut config = valid_config();
        config.credentials.token_secret.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_secret"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn from_file_reads_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloudsync.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "credentials:\n  public_key: pub\n  private_key: priv\n  token: tok\n  token_secret: sec\nsync:\n  interval_secs: 60"
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.sync.interval_secs, 60);
        // Unspecified sections fall back to defaults
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }
}
