//! MyPrime back-office configuration
//!
//! TOML file configuration with `MYPRIME_*` environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the back-office REST API
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
    pub login_path: String,
    pub refresh_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 30_000,
            user_agent: "MyPrime-Backoffice".to_string(),
            login_path: "/api/users/login".to_string(),
            refresh_path: "/api/auth/refresh".to_string(),
        }
    }
}

/// Where the admin session is persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    File,
    Memory,
}

impl std::str::FromStr for SessionStoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionStoreKind::File),
            "memory" => Ok(SessionStoreKind::Memory),
            other => Err(ConfigError::ValidationError(format!(
                "unknown session store '{}', expected 'file' or 'memory'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub store: SessionStoreKind,
    /// Session file, used when `store = "file"`
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: SessionStoreKind::File,
            path: "./data/session.json".to_string(),
        }
    }
}

/// Staleness windows for cached queries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_stale_ms: u64,
    pub profile_stale_ms: u64,
    pub stats_stale_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_stale_ms: 30_000,
            profile_stale_ms: 5 * 60_000,
            stats_stale_ms: 60_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::ValidationError("api.base_url is empty".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError("api.timeout_ms must be > 0".into()));
        }
        for (name, path) in [
            ("api.login_path", &self.api.login_path),
            ("api.refresh_path", &self.api.refresh_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with '/'",
                    name
                )));
            }
        }
        if self.session.store == SessionStoreKind::File && self.session.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "session.path is required for the file store".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# MyPrime back-office configuration
# Environment variables (MYPRIME_*) override these settings

[api]
base_url = "http://localhost:3000"
timeout_ms = 30000
user_agent = "MyPrime-Backoffice"
login_path = "/api/users/login"
refresh_path = "/api/auth/refresh"

[session]
store = "file"  # file or memory
path = "./data/session.json"

[cache]
default_stale_ms = 30000
profile_stale_ms = 300000
stats_stale_ms = 60000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(parsed.api.base_url, defaults.api.base_url);
        assert_eq!(parsed.api.refresh_path, defaults.api.refresh_path);
        assert_eq!(parsed.session.store, SessionStoreKind::File);
        assert_eq!(parsed.cache.profile_stale_ms, 300_000);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
[api]
base_url = "https://api.myprime.ng"
"#,
        )
        .unwrap();
        assert_eq!(parsed.api.base_url, "https://api.myprime.ng");
        assert_eq!(parsed.api.timeout_ms, 30_000);
        assert_eq!(parsed.session.path, "./data/session.json");
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.api.base_url = "  ".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.base_url = "ftp://example".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.refresh_path = "auth/refresh".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.session.path = String::new();
        assert!(config.validate().is_err());
        config.session.store = SessionStoreKind::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_kind_parsing() {
        assert_eq!("File".parse::<SessionStoreKind>().unwrap(), SessionStoreKind::File);
        assert_eq!(" memory ".parse::<SessionStoreKind>().unwrap(), SessionStoreKind::Memory);
        assert!("redis".parse::<SessionStoreKind>().is_err());
    }
}
