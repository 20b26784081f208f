//! SDK Configuration

use crate::error::{Error, Result};
use mp_config::AppConfig;
use reqwest::Url;
use std::time::Duration;

/// Configuration for the back-office client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the back-office API
    pub base_url: String,

    /// Login endpoint path
    pub login_path: String,

    /// Token refresh endpoint path
    pub refresh_path: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Default staleness window for cached queries
    pub stale_time: Duration,

    /// Staleness window for the admin profile
    pub profile_stale_time: Duration,

    /// Staleness window for aggregate stats (loan stats, savings stats)
    pub stats_stale_time: Duration,
}

impl Config {
    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            login_path: "/api/users/login".to_string(),
            refresh_path: "/api/auth/refresh".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("MyPrime-Backoffice-SDK/{}", env!("CARGO_PKG_VERSION")),
            stale_time: Duration::from_secs(30),
            profile_stale_time: Duration::from_secs(5 * 60),
            stats_stale_time: Duration::from_secs(60),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_stale_time(mut self, stale: Duration) -> Self {
        self.stale_time = stale;
        self
    }

    pub fn with_profile_stale_time(mut self, stale: Duration) -> Self {
        self.profile_stale_time = stale;
        self
    }

    pub fn with_stats_stale_time(mut self, stale: Duration) -> Self {
        self.stats_stale_time = stale;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `path` followed by one percent-encoded segment per entry, so ids
    /// containing `/`, `?` or `#` stay inside their segment.
    pub fn url_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| Error::Config(format!("Invalid URL for {}: {}", path, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL cannot take path segments: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn login_url(&self) -> String {
        self.url(&self.login_path)
    }

    pub fn refresh_url(&self) -> String {
        self.url(&self.refresh_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

impl From<&AppConfig> for Config {
    fn from(app: &AppConfig) -> Self {
        Config::new(app.api.base_url.clone())
            .with_login_path(app.api.login_path.clone())
            .with_refresh_path(app.api.refresh_path.clone())
            .with_timeout(Duration::from_millis(app.api.timeout_ms))
            .with_user_agent(app.api.user_agent.clone())
            .with_stale_time(Duration::from_millis(app.cache.default_stale_ms))
            .with_profile_stale_time(Duration::from_millis(app.cache.profile_stale_ms))
            .with_stats_stale_time(Duration::from_millis(app.cache.stats_stale_ms))
    }
}
