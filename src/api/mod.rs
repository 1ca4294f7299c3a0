//! REST API endpoints.
//!
//! Axum-based HTTP API serving the dataset catalogue and the derived
//! standings for a selection passed as query parameters.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::calculate::{EngineError, ScoreEngine};
use crate::config::ServerConfig;
use crate::models::{parse_id_list, DropCount, InvalidIdError};

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidIdError> for ApiError {
    fn from(e: InvalidIdError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Selection passed on the query string.
///
/// `drop` is clamped (anything invalid means 0). `players` and `maps` are
/// comma-separated ids; omitting `players` selects everyone.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionParams {
    pub drop: Option<String>,
    pub players: Option<String>,
    pub maps: Option<String>,
}

impl SelectionParams {
    /// Apply this selection to an engine.
    pub fn apply(&self, engine: &mut ScoreEngine) -> Result<(), ApiError> {
        let drop = self
            .drop
            .as_deref()
            .map(DropCount::parse)
            .unwrap_or_default();
        engine.set_drop(drop);

        if let Some(players) = &self.players {
            engine.set_selected_players(parse_id_list(players)?);
        }
        if let Some(maps) = &self.maps {
            engine.set_selected_maps(parse_id_list(maps)?);
        }
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dataset", get(routes::dataset::get_dataset))
        .route(
            "/api/leaderboards/active",
            get(routes::standings::active_leaderboards),
        )
        .route(
            "/api/leaderboards/dropped",
            get(routes::standings::dropped_leaderboards),
        )
        .route("/api/averages", get(routes::standings::averages))
        .route("/api/custom", get(routes::standings::custom_leaderboard))
        .route("/api/dashboard", get(routes::standings::dashboard))
        .route("/api/maps/:beatmap_id", get(routes::standings::map_detail))
        .with_state(state)
}

/// Wrap the API router with request tracing, CORS and optional static files.
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let mut app = build_router(state);

    if let Some(dir) = &server.static_dir {
        info!("Serving static files from {:?}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    let cors = CorsLayer::new().allow_methods([Method::GET]);
    let cors = if server.cors_origin == "*" {
        Some(cors.allow_origin(Any))
    } else {
        match server.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => Some(cors.allow_origin(origin)),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", server.cors_origin);
                None
            }
        }
    };
    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, EngineFeatures};
    use std::sync::Arc;

    fn engine() -> ScoreEngine {
        ScoreEngine::with_dataset(Arc::new(Dataset::default()), EngineFeatures::default())
    }

    #[test]
    fn test_selection_params_defaults() {
        let mut engine = engine();
        SelectionParams::default().apply(&mut engine).unwrap();

        assert!(engine.selection().drop_count.is_zero());
        assert!(engine.selection().players.is_none());
        assert!(engine.selection().maps.is_empty());
    }

    #[test]
    fn test_selection_params_apply() {
        let mut engine = engine();
        let params = SelectionParams {
            drop: Some("3".to_string()),
            players: Some("1,2".to_string()),
            maps: Some("10".to_string()),
        };
        params.apply(&mut engine).unwrap();

        assert_eq!(engine.selection().drop_count.get(), 3);
        assert_eq!(
            engine.selection().players,
            Some([1, 2].into_iter().collect())
        );
        assert!(engine.selection().maps.contains(&10));
    }

    #[test]
    fn test_selection_params_invalid_drop_clamps() {
        let mut engine = engine();
        let params = SelectionParams {
            drop: Some("-4".to_string()),
            ..SelectionParams::default()
        };
        params.apply(&mut engine).unwrap();
        assert!(engine.selection().drop_count.is_zero());
    }

    #[test]
    fn test_selection_params_bad_ids() {
        let mut engine = engine();
        let params = SelectionParams {
            players: Some("1,x".to_string()),
            ..SelectionParams::default()
        };
        assert!(matches!(
            params.apply(&mut engine),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EngineError::NotLoaded).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
