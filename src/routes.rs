//! API route handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::GamesService;
use crate::types::{CronResponse, ErrorResponse, HealthResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub games: GamesService,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the router with all routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", get(games))
        .route("/cron", get(cron))
        .route("/api/games", get(games))
        .route("/api/cron", get(cron))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Games endpoint: cached dataset, refreshed when stale.
pub async fn games(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let dataset = state.games.read(false).await;
    let body = serde_json::to_string_pretty(&dataset)
        .map_err(|e| ApiError::internal(format!("Failed to encode games: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Cron endpoint: force a refresh and report where the data came from.
pub async fn cron(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let refreshed = state.games.refresh().await;
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(CronResponse {
            ok: true,
            source: refreshed.provenance,
            updated: refreshed.dataset.updated,
        }),
    )
}
