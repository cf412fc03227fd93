//! System endpoints: health check and supported-game metadata.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::Game;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Supported game info.
#[derive(Debug, Serialize, ToSchema)]
struct GameInfo {
    game: &'static str,
    title: &'static str,
}

/// `GET /config/games` — List supported games.
#[utoipa::path(
    get,
    path = "/config/games",
    tag = "System",
    summary = "List supported games",
    description = "Returns every game whose items can be traded on the platform.",
    responses(
        (status = 200, description = "Game catalog", body = Vec<GameInfo>),
    )
)]
pub async fn games_handler() -> impl IntoResponse {
    let games: Vec<GameInfo> = Game::ALL
        .iter()
        .map(|g| GameInfo {
            game: g.as_str(),
            title: g.title(),
        })
        .collect();
    (StatusCode::OK, Json(games))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/games", get(games_handler))
}
