use crate::error::ExporterError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Longest accepted refresh interval: one day.
pub const MAX_REFRESH_INTERVAL_SECONDS: u64 = 86_400;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub solr: SolrConfig,
    #[serde(default)]
    pub passthrough: PassthroughConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_socket")]
    pub listen_socket: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolrConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PassthroughConfig {
    #[serde(default = "default_passthrough_socket")]
    pub socket_path: String,
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default = "default_passthrough_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_seconds: u64,
}

fn default_listen_socket() -> String {
    "/dev/shm/solr_exporter.sock".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080/solr".to_string()
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    3000
}

fn default_passthrough_socket() -> String {
    "/dev/shm/solr_detail_exporter.sock".to_string()
}

fn default_passthrough_timeout_ms() -> u64 {
    5000
}

fn default_refresh_interval() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_socket: default_listen_socket(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            socket_path: default_passthrough_socket(),
            path: default_metrics_path(),
            timeout_ms: default_passthrough_timeout_ms(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_refresh_interval(),
        }
    }
}

impl SolrConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl PassthroughConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Config {
    /// Load configuration from an optional TOML file.
    ///
    /// A missing file is not an error; every field has a default. Command-line
    /// overrides are applied by the caller before [`Config::validate`].
    pub fn load(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        let base_url = self.solr.base_url.trim();
        if base_url.is_empty() {
            return Err(ExporterError::Config("Solr base URL is empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ExporterError::Config(format!(
                "Solr base URL must start with http:// or https://, got {}",
                base_url
            )));
        }
        if !self.server.metrics_path.starts_with('/') || self.server.metrics_path == "/" {
            return Err(ExporterError::Config(format!(
                "Metrics path must start with '/' and must not be the root path, got {}",
                self.server.metrics_path
            )));
        }
        if self.server.listen_socket.is_empty() {
            return Err(ExporterError::Config("Listen socket path is empty".to_string()));
        }
        if self.solr.request_timeout_ms == 0 {
            return Err(ExporterError::Config(
                "Solr request timeout must be greater than zero".to_string(),
            ));
        }
        if self.passthrough.timeout_ms == 0 {
            return Err(ExporterError::Config(
                "Passthrough timeout must be greater than zero".to_string(),
            ));
        }
        if self.refresh.interval_seconds == 0
            || self.refresh.interval_seconds > MAX_REFRESH_INTERVAL_SECONDS
        {
            return Err(ExporterError::Config(format!(
                "Refresh interval must be between 1 and {} seconds, got {}",
                MAX_REFRESH_INTERVAL_SECONDS, self.refresh.interval_seconds
            )));
        }
        Ok(())
    }
}
