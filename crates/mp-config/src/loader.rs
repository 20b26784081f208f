//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError, SessionStoreKind};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "myprime.toml",
    "./config/config.toml",
    "./config/myprime.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file not found, searching defaults");
        }

        if let Some(path) = lookup("MYPRIME_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // API
    if let Some(val) = lookup("MYPRIME_API_BASE_URL") {
        config.api.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = lookup("MYPRIME_API_TIMEOUT_MS") {
        match val.parse() {
            Ok(timeout) => config.api.timeout_ms = timeout,
            Err(_) => warn!(value = %val, "Ignoring non-numeric MYPRIME_API_TIMEOUT_MS"),
        }
    }
    if let Some(val) = lookup("MYPRIME_API_USER_AGENT") {
        config.api.user_agent = val;
    }
    if let Some(val) = lookup("MYPRIME_LOGIN_PATH") {
        config.api.login_path = val;
    }
    if let Some(val) = lookup("MYPRIME_REFRESH_PATH") {
        config.api.refresh_path = val;
    }

    // Session
    if let Some(val) = lookup("MYPRIME_SESSION_STORE") {
        config.session.store = val.parse::<SessionStoreKind>()?;
    }
    if let Some(val) = lookup("MYPRIME_SESSION_PATH") {
        config.session.path = val;
    }

    // Cache
    if let Some(val) = lookup("MYPRIME_CACHE_STALE_MS") {
        match val.parse() {
            Ok(stale) => config.cache.default_stale_ms = stale,
            Err(_) => warn!(value = %val, "Ignoring non-numeric MYPRIME_CACHE_STALE_MS"),
        }
    }

    Ok(())
}
