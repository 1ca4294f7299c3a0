//! osu! API v1 client.
//!
//! v1 returns every number as a string, so the response types keep strings
//! and callers parse what they need.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::ExportError;

#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    pub beatmap_id: String,
    #[serde(default)]
    pub scores: Vec<GameScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameScore {
    pub user_id: String,
    pub score: String,
    pub count50: String,
    pub count100: String,
    pub count300: String,
    pub countmiss: String,
    pub enabled_mods: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeatmapInfo {
    pub artist: String,
    pub title: String,

    /// Difficulty name
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UserInfo {
    username: String,
}

/// The osu! API calls the exporter needs.
#[async_trait]
pub trait OsuApi: Send + Sync {
    async fn get_match(&self, match_id: u64) -> Result<MatchResponse, ExportError>;

    /// `None` when the beatmap does not exist.
    async fn get_beatmap(&self, beatmap_id: u64) -> Result<Option<BeatmapInfo>, ExportError>;

    /// `None` when the user does not exist (e.g. restricted).
    async fn get_username(&self, user_id: u64) -> Result<Option<String>, ExportError>;
}

/// HTTP client for the osu! API v1.
pub struct OsuClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl OsuClient {
    pub fn new(base_url: Url, api_key: String, timeout: Duration) -> Result<Self, ExportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExportError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| ExportError::InvalidUrl(e.to_string()))?;
        debug!("GET {}", url);

        let mut query = vec![("k", self.api_key.clone())];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        let response = self.client.get(url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::ApiStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl OsuApi for OsuClient {
    async fn get_match(&self, match_id: u64) -> Result<MatchResponse, ExportError> {
        self.get("get_match", &[("mp", match_id.to_string())]).await
    }

    async fn get_beatmap(&self, beatmap_id: u64) -> Result<Option<BeatmapInfo>, ExportError> {
        let beatmaps: Vec<BeatmapInfo> = self
            .get("get_beatmaps", &[("b", beatmap_id.to_string())])
            .await?;
        Ok(beatmaps.into_iter().next())
    }

    async fn get_username(&self, user_id: u64) -> Result<Option<String>, ExportError> {
        let users: Vec<UserInfo> = self
            .get(
                "get_user",
                &[("u", user_id.to_string()), ("type", "id".to_string())],
            )
            .await?;
        Ok(users.into_iter().next().map(|u| u.username))
    }
}
