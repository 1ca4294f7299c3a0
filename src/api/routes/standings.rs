use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{ApiError, SelectionParams};
use crate::calculate::ScoreEngine;
use crate::models::{
    AverageRow, BeatmapId, CustomLeaderboard, Dashboard, DropCount, Map, MapLeaderboard,
};

#[derive(Debug, Serialize)]
pub struct LeaderboardsResponse {
    pub drop_count: DropCount,
    pub maps: Vec<MapLeaderboard>,
}

#[derive(Debug, Serialize)]
pub struct AveragesResponse {
    pub drop_count: DropCount,
    pub rows: Vec<AverageRow>,
}

#[derive(Debug, Serialize)]
pub struct CustomResponse {
    pub custom: Option<CustomLeaderboard>,
}

#[derive(Debug, Serialize)]
pub struct MapDetailResponse {
    pub map: Map,
    pub drop_count: DropCount,
    pub active: MapLeaderboard,
    pub dropped: MapLeaderboard,
}

fn engine_for(state: &AppState, params: &SelectionParams) -> Result<ScoreEngine, ApiError> {
    let mut engine = state.engine();
    params.apply(&mut engine)?;
    Ok(engine)
}

pub async fn active_leaderboards(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<LeaderboardsResponse>, ApiError> {
    let engine = engine_for(&state, &params)?;
    Ok(Json(LeaderboardsResponse {
        drop_count: engine.selection().drop_count,
        maps: engine.compute_active_leaderboards()?,
    }))
}

pub async fn dropped_leaderboards(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<LeaderboardsResponse>, ApiError> {
    let engine = engine_for(&state, &params)?;
    Ok(Json(LeaderboardsResponse {
        drop_count: engine.selection().drop_count,
        maps: engine.compute_dropped_leaderboards()?,
    }))
}

pub async fn averages(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<AveragesResponse>, ApiError> {
    let engine = engine_for(&state, &params)?;
    Ok(Json(AveragesResponse {
        drop_count: engine.selection().drop_count,
        rows: engine.compute_averages()?,
    }))
}

pub async fn custom_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<CustomResponse>, ApiError> {
    let engine = engine_for(&state, &params)?;
    Ok(Json(CustomResponse {
        custom: engine.compute_custom_leaderboard()?,
    }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<Dashboard>, ApiError> {
    let engine = engine_for(&state, &params)?;
    Ok(Json(engine.compute_dashboard()?))
}

/// Kept and dropped scores on one map.
pub async fn map_detail(
    State(state): State<AppState>,
    Path(beatmap_id): Path<BeatmapId>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<MapDetailResponse>, ApiError> {
    let map = state
        .dataset
        .map(beatmap_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Map {}", beatmap_id)))?;

    let engine = engine_for(&state, &params)?;
    let pick = |boards: Vec<MapLeaderboard>| {
        boards
            .into_iter()
            .find(|b| b.beatmap_id == beatmap_id)
            .ok_or_else(|| ApiError::Internal(format!("No leaderboard for map {}", beatmap_id)))
    };

    Ok(Json(MapDetailResponse {
        map,
        drop_count: engine.selection().drop_count,
        active: pick(engine.compute_active_leaderboards()?)?,
        dropped: pick(engine.compute_dropped_leaderboards()?)?,
    }))
}
