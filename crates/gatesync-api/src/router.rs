//! Route definitions for the GateSync HTTP API.
//!
//! Device, public, and admin routes are organized by surface and mounted
//! under `/api`; the WebSocket upgrade and health check live at the root.

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gatesync_core::config::app::ServerConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(device_routes())
        .merge(public_routes())
        .merge(admin_routes());

    let cors = build_cors_layer(&state);
    let timeout = TimeoutLayer::new(request_timeout(&state.config.server));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Device protocol: pairing, sync, and attendance ingestion.
fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/device/connect", post(handlers::device::connect))
        .route("/device/validate", get(handlers::device::validate))
        .route("/device/status", get(handlers::device::status))
        .route("/device/heartbeat", post(handlers::device::heartbeat))
        .route("/device/sync/pull", post(handlers::device::sync_pull))
        .route("/device/attendance", post(handlers::attendance::ingest_batch))
        .route(
            "/device/attendance/check-in",
            post(handlers::attendance::check_in),
        )
        .route(
            "/device/attendance/check-out",
            post(handlers::attendance::check_out),
        )
        .route(
            "/device/attendance/pull",
            post(handlers::attendance::pull_feed),
        )
        .route(
            "/device/attendance/pending",
            get(handlers::attendance::pending),
        )
        .route("/device/scan", post(handlers::attendance::smart_scan))
}

/// Simplified public surface with per-call key validation.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/validate", get(handlers::public::validate))
        .route("/public/status", get(handlers::public::status))
        .route("/public/heartbeat", post(handlers::public::heartbeat))
        .route("/public/sync", post(handlers::public::sync))
        .route("/public/students", get(handlers::public::students))
        .route("/public/guardians", get(handlers::public::guardians))
        .route("/public/check-in", post(handlers::public::check_in))
        .route("/public/check-out", post(handlers::public::check_out))
        .route("/public/scan", post(handlers::public::scan))
        .route(
            "/public/attendance/today",
            get(handlers::public::attendance_today),
        )
        .route(
            "/public/attendance/checked-in",
            get(handlers::public::attendance_checked_in),
        )
        .route(
            "/public/attendance/stats",
            get(handlers::public::attendance_stats),
        )
}

/// Admin license management.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/licenses/generate",
            post(handlers::license_admin::generate),
        )
        .route(
            "/admin/licenses/{id}/regenerate",
            post(handlers::license_admin::regenerate),
        )
        .route(
            "/admin/licenses/revoke",
            post(handlers::license_admin::revoke),
        )
        .route("/admin/licenses", get(handlers::license_admin::list))
}

/// Per-request deadline from configuration. The WebSocket upgrade response
/// completes within it; the upgraded stream is not subject to it.
fn request_timeout(server: &ServerConfig) -> Duration {
    Duration::from_secs(server.request_timeout_seconds)
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use tower_http::cors::Any;

    let allowed = &state.config.server.allowed_origins;
    let mut cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any);

    if allowed.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> =
            allowed.iter().filter_map(|o| o.parse().ok()).collect();
        cors = cors.allow_origin(origins);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_comes_from_config() {
        let server = ServerConfig {
            request_timeout_seconds: 45,
            ..ServerConfig::default()
        };
        assert_eq!(request_timeout(&server), Duration::from_secs(45));
        assert_eq!(
            request_timeout(&ServerConfig::default()),
            Duration::from_secs(30)
        );
    }
}
