//! Server configuration.
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `config.json` in the user config dir (a missing file is not an error)
//! 3. Environment (`VIDRELAY_BIND`, `PROXY_SERVICE_URL`, `GOOGLE_API_KEY`)
//! 4. CLI flags, applied by the binary

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use vidrelay_fetch::{Endpoints, ResolverSettings};
use vidrelay_providers::BackendClient;

/// Environment variable overriding the bind address.
pub const ENV_BIND: &str = "VIDRELAY_BIND";
/// Environment variable naming the external proxy backend.
pub const ENV_BACKEND: &str = "PROXY_SERVICE_URL";
/// Environment variable carrying the files API key.
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";

/// Default mount path of the proxy endpoint.
pub const DEFAULT_MOUNT_PATH: &str = "/api/proxy";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON.
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Bind address could not be parsed.
    #[error("Invalid bind address: {0}")]
    InvalidBind(String),
}

/// Proxy server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Path the proxy endpoint is mounted at.
    pub mount_path: String,
    /// External proxy backend for providers without a built-in resolver.
    pub backend_url: Option<String>,
    /// Key for the authenticated files API.
    pub drive_api_key: Option<String>,
    /// Attempts per approach and per final fetch.
    pub max_retries: u32,
    /// Wait in seconds when the upstream gives no `Retry-After`.
    pub default_backoff_secs: u64,
    /// Bound on viewer-redirect recursion.
    pub max_redirect_depth: u8,
    /// Upstream endpoint overrides.
    pub endpoints: Endpoints,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let settings = ResolverSettings::default();
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            backend_url: None,
            drive_api_key: None,
            max_retries: settings.max_retries,
            default_backoff_secs: settings.default_backoff.as_secs(),
            max_redirect_depth: settings.max_redirect_depth,
            endpoints: settings.endpoints,
        }
    }
}

impl ServerConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidrelay")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(bind) = get(ENV_BIND) {
            self.bind = bind
                .parse()
                .map_err(|_| ConfigError::InvalidBind(bind.clone()))?;
        }
        if let Some(url) = get(ENV_BACKEND) {
            self.backend_url = Some(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.drive_api_key = Some(key);
        }
        Ok(self)
    }

    /// Mount path with exactly one leading slash and no trailing slash.
    pub fn normalized_mount_path(&self) -> String {
        let trimmed = self.mount_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            DEFAULT_MOUNT_PATH.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Resolver settings derived from this configuration.
    pub fn resolver_settings(&self) -> ResolverSettings {
        let mut settings = ResolverSettings::default()
            .with_max_retries(self.max_retries)
            .with_default_backoff(Duration::from_secs(self.default_backoff_secs))
            .with_endpoints(self.endpoints.clone());
        settings.max_redirect_depth = self.max_redirect_depth;

        if let Some(key) = &self.drive_api_key {
            settings = settings.with_api_key(key.clone());
            if settings.usable_api_key().is_none() {
                warn!("Configured API key is too short and will be ignored");
            }
        }
        settings
    }

    /// Client for the external backend, if one is configured.
    pub fn backend(&self) -> Option<BackendClient> {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(BackendClient::new)
    }
}
