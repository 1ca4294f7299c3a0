use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::calculate::ordered_maps;
use crate::models::{BeatmapId, EngineFeatures, UserId};
use crate::storage::DatasetInfo;

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub user_id: UserId,
    pub username: String,
    pub score_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MapSummary {
    pub beatmap_id: BeatmapId,
    pub slot: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub info: DatasetInfo,
    pub features: EngineFeatures,
    pub players: Vec<PlayerSummary>,

    /// Maps in display order
    pub maps: Vec<MapSummary>,

    /// Largest useful drop count (most scores held by one player)
    pub max_drop: usize,
}

/// Catalogue used to build the player and map pickers.
pub async fn get_dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let dataset = &state.dataset;

    let players = dataset
        .players
        .values()
        .map(|p| PlayerSummary {
            user_id: p.user_id,
            username: dataset.username(p.user_id).to_string(),
            score_count: p.scores.len(),
        })
        .collect();

    let maps = ordered_maps(dataset)
        .into_iter()
        .map(|m| MapSummary {
            beatmap_id: m.beatmap_id,
            slot: m.slot.clone(),
            artist: m.artist.clone(),
            title: m.title.clone(),
            difficulty: m.difficulty.clone(),
        })
        .collect();

    let max_drop = dataset
        .players
        .values()
        .map(|p| p.scores.len())
        .max()
        .unwrap_or(0);

    Json(DatasetResponse {
        info: (*state.info).clone(),
        features: state.features,
        players,
        maps,
        max_drop,
    })
}
