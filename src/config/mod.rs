//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::EngineFeatures;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Dataset location configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File path or http(s) URL of the results document
    #[serde(default = "default_location")]
    pub location: String,

    /// Timeout for HTTP locations, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_location() -> String {
    "./data/osu_scores.json".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory of front-end files served at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

/// Dataset exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// osu! API v1 base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Delay between API requests, in milliseconds
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    #[serde(default = "default_mp_links_file")]
    pub mp_links_file: PathBuf,

    #[serde(default = "default_mappool_file")]
    pub mappool_file: PathBuf,

    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_api_base_url() -> String {
    "https://osu.ppy.sh/api/".to_string()
}

fn default_request_delay() -> u64 {
    500
}

fn default_mp_links_file() -> PathBuf {
    PathBuf::from("mp_links.txt")
}

fn default_mappool_file() -> PathBuf {
    PathBuf::from("mappool.json")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("data/osu_scores.json")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_delay_ms: default_request_delay(),
            mp_links_file: default_mp_links_file(),
            mappool_file: default_mappool_file(),
            output_file: default_output_file(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub features: EngineFeatures,

    #[serde(default)]
    pub export: ExportConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dataset: DatasetConfig::default(),
            server: ServerConfig::default(),
            features: EngineFeatures::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.location.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Dataset location must not be empty".to_string(),
            ));
        }

        if self.dataset.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Dataset timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.export.api_base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid export API base URL: {}",
                self.export.api_base_url
            )));
        }

        Ok(())
    }
}
