//! Dataset loading.
//!
//! The dashboard reads its dataset exactly once at startup, either from a
//! local JSON file or over HTTP. The raw document is hashed so clients can
//! tell which revision of the results they are looking at.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::models::Dataset;

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Somewhere a dataset document can be read from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable location for logs and the dataset info.
    fn describe(&self) -> String;

    /// Read the raw JSON document.
    async fn fetch(&self) -> Result<String, LoadError>;
}

/// Dataset stored in a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

/// Dataset served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        debug!("Fetching dataset from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Where to read the dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    File(PathBuf),
    Url(Url),
}

impl DatasetLocation {
    /// `http(s)://` locations are URLs; anything else is a file path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            if let Ok(url) = Url::parse(s) {
                return DatasetLocation::Url(url);
            }
        }
        DatasetLocation::File(PathBuf::from(s))
    }

    /// Build the matching source.
    pub fn into_source(self, timeout: Duration) -> Result<Box<dyn DatasetSource>, LoadError> {
        Ok(match self {
            DatasetLocation::File(path) => Box::new(FileSource::new(path)),
            DatasetLocation::Url(url) => Box::new(HttpSource::new(url, timeout)?),
        })
    }
}

/// Summary of the loaded dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub source: String,

    /// First 16 hex chars of the SHA-256 of the raw document
    pub digest: String,

    pub loaded_at: DateTime<Utc>,
    pub users: usize,
    pub maps: usize,
    pub players: usize,
    pub scores: usize,
}

/// A dataset together with its load summary.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Arc<Dataset>,
    pub info: DatasetInfo,
}

/// Short content digest of a raw document.
pub fn digest(raw: &str) -> String {
    let hash = Sha256::digest(raw.as_bytes());
    hex::encode(hash)[..16].to_string()
}

/// Read and parse the dataset from a source.
pub async fn load_dataset(source: &dyn DatasetSource) -> Result<LoadedDataset, LoadError> {
    let raw = source.fetch().await?;
    let dataset = Dataset::from_json(&raw)?;

    let info = DatasetInfo {
        source: source.describe(),
        digest: digest(&raw),
        loaded_at: Utc::now(),
        users: dataset.users.len(),
        maps: dataset.maps.len(),
        players: dataset.players.len(),
        scores: dataset.score_count(),
    };

    info!(
        "Loaded dataset from {} ({} players, {} maps, {} scores, digest {})",
        info.source, info.players, info.maps, info.scores, info.digest
    );

    Ok(LoadedDataset {
        dataset: Arc::new(dataset),
        info,
    })
}
