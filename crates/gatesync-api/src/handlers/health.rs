//! Health check handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Build version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Live guardian socket count.
    pub ws_connections: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "unreachable",
    };

    Json(ApiResponse::ok(HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        ws_connections: state.realtime.connection_count(),
    }))
}
