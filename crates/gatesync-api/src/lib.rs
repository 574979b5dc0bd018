//! # gatesync-api
//!
//! HTTP API layer for GateSync built on Axum.
//!
//! Exposes the device protocol, the simplified public surface, the admin
//! license endpoints, the guardian WebSocket upgrade, extractors, DTOs,
//! and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
