//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::catalog::{CatalogError, MetricCatalog};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted export upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Extracted datasets kept in memory before the oldest is evicted
    #[serde(default = "default_max_datasets")]
    pub max_datasets: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_upload_mb() -> usize {
    200
}

fn default_max_datasets() -> usize {
    4
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
            max_datasets: default_max_datasets(),
        }
    }
}

/// Metric catalog source
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// TOML catalog file; the built-in HealthKit catalog when unset
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            std::env::var("VITALOG_CONFIG").ok().map(PathBuf::from),
            dirs::config_dir().map(|p| p.join("vitalog").join("config.toml")),
            Some(PathBuf::from("./vitalog.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Build the metric catalog this config points at
    pub fn build_catalog(&self) -> Result<Arc<MetricCatalog>, ConfigError> {
        match &self.catalog.path {
            Some(path) => {
                let catalog = MetricCatalog::load(Path::new(path))?;
                tracing::info!(
                    path = %path,
                    categories = catalog.categories().len(),
                    metrics = catalog.len(),
                    "Loaded metric catalog"
                );
                Ok(Arc::new(catalog))
            }
            None => Ok(Arc::new(MetricCatalog::healthkit().clone())),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `VITALOG_*` overrides from `lookup`
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(host) = lookup("VITALOG_API_HOST") {
            self.api.host = host;
        }
        if let Some(p) = lookup("VITALOG_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = p;
        }
        if let Some(mb) = lookup("VITALOG_MAX_UPLOAD_MB").and_then(|v| v.parse().ok()) {
            self.api.max_upload_mb = mb;
        }

        if let Some(path) = lookup("VITALOG_CATALOG") {
            self.catalog.path = Some(path);
        }

        // Logging overrides
        if let Some(level) = lookup("VITALOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("VITALOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid metric catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Vitalog Configuration
#
# Environment variables override these settings:
# - VITALOG_API_HOST
# - VITALOG_API_PORT
# - VITALOG_MAX_UPLOAD_MB
# - VITALOG_CATALOG
# - VITALOG_LOG_LEVEL
# - VITALOG_LOG_FORMAT

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8090

# Largest accepted export upload (megabytes)
max_upload_mb = 200

# Extracted exports kept in memory; the oldest is dropped beyond this
max_datasets = 4

[catalog]
# Custom metric catalog (TOML). Omit to use the built-in HealthKit catalog.
# path = "/etc/vitalog/catalog.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
