use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;
use thiserror::Error;

use crate::application::BridgeSettings;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_PACKAGE: &str = "com.fitlink.bridge";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EVENT_BUFFER: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("UTC offset out of range: {0} minutes")]
    InvalidOffset(i32),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub app_package_name: String,
    pub request_timeout_secs: u64,
    pub utc_offset_minutes: i32,
    pub event_buffer: usize,
    pub log_level: String,
}

/// Optional TOML file; every key may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    port: Option<u16>,
    app_package_name: Option<String>,
    request_timeout_secs: Option<u64>,
    utc_offset_minutes: Option<i32>,
    event_buffer: Option<usize>,
    log_level: Option<String>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

impl Config {
    /// Config file named by `FITLINK_CONFIG` (if any), overridden by environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env::var("FITLINK_CONFIG") {
            Ok(path) => FileConfig::read(Path::new(&path))?,
            Err(_) => FileConfig::default(),
        };
        Ok(Self::resolve(file, |key| env::var(key).ok()))
    }

    /// Environment variables only
    pub fn from_env() -> Self {
        Self::resolve(FileConfig::default(), |key| env::var(key).ok())
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content)?;
        Ok(Self::resolve(file, |_| None))
    }

    fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
            value.and_then(|s| s.parse().ok())
        }

        Self {
            port: parsed(lookup("FITLINK_PORT"))
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
            app_package_name: lookup("FITLINK_APP_PACKAGE")
                .or(file.app_package_name)
                .unwrap_or_else(|| DEFAULT_APP_PACKAGE.to_string()),
            request_timeout_secs: parsed(lookup("FITLINK_REQUEST_TIMEOUT"))
                .or(file.request_timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            utc_offset_minutes: parsed(lookup("FITLINK_UTC_OFFSET_MINUTES"))
                .or(file.utc_offset_minutes)
                .unwrap_or(0),
            event_buffer: parsed(lookup("FITLINK_EVENT_BUFFER"))
                .or(file.event_buffer)
                .unwrap_or(DEFAULT_EVENT_BUFFER),
            log_level: lookup("FITLINK_LOG_LEVEL")
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_minutes))
    }

    pub fn bridge_settings(&self) -> Result<BridgeSettings, ConfigError> {
        Ok(BridgeSettings {
            app_package_name: self.app_package_name.clone(),
            request_timeout: self.request_timeout(),
            utc_offset: self.utc_offset()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.app_package_name, "com.fitlink.bridge");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.event_buffer, 256);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.utc_offset().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_file_values() {
        let config = Config::from_toml_str(
            r#"
            port = 8080
            app_package_name = "com.example.fitness"
            request_timeout_secs = 15
            utc_offset_minutes = -300
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.app_package_name, "com.example.fitness");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.utc_offset().unwrap(), FixedOffset::west_opt(5 * 3600).unwrap());
    }

    #[test]
    fn test_env_overrides_file_and_ignores_garbage() {
        let file: FileConfig = toml::from_str("port = 8080\nrequest_timeout_secs = 15").unwrap();
        let env: HashMap<&str, &str> = [("FITLINK_PORT", "9090"), ("FITLINK_REQUEST_TIMEOUT", "soon")].into();

        let config = Config::resolve(file, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.port, 9090);
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::from_toml_str("prot = 8080").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_out_of_range_offset() {
        let config = Config::from_toml_str("utc_offset_minutes = 1500").unwrap();
        assert!(matches!(config.utc_offset(), Err(ConfigError::InvalidOffset(1500))));
        assert!(config.bridge_settings().is_err());
    }
}
