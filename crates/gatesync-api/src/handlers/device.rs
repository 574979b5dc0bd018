//! Device protocol handlers: connect, validate, status, heartbeat, sync.

use axum::extract::State;
use axum::Json;

use gatesync_entity::person::PersonType;

use crate::dto::request::{ConnectDescriptor, HeartbeatRequest, SyncPullRequest};
use crate::dto::response::{
    ApiResponse, ConnectResponse, MessageResponse, SyncPullResponse, ValidateResponse,
};
use crate::error::ApiError;
use crate::extractors::{DeviceAuth, PairedDevice};
use crate::state::AppState;

/// POST /api/device/connect
pub async fn connect(
    State(state): State<AppState>,
    auth: DeviceAuth,
    Json(body): Json<ConnectDescriptor>,
) -> Result<Json<ApiResponse<ConnectResponse>>, ApiError> {
    let (connection, _license, gate) = state
        .pairing_service
        .connect(&auth.license_key, &body)
        .await?;

    Ok(Json(ApiResponse::ok(ConnectResponse {
        connection,
        gate: gate.into(),
    })))
}

/// GET /api/device/validate
pub async fn validate(
    State(state): State<AppState>,
    auth: DeviceAuth,
) -> Result<Json<ApiResponse<ValidateResponse>>, ApiError> {
    // The extractor already validated; fetch again for the gate summary.
    let (license, gate) = state.license_service.validate(&auth.license_key).await?;
    Ok(Json(ApiResponse::ok(ValidateResponse::new(&license, &gate))))
}

/// GET /api/device/status
pub async fn status(
    State(state): State<AppState>,
    device: PairedDevice,
) -> Result<Json<ApiResponse<gatesync_service::pairing::DeviceStatus>>, ApiError> {
    let status = state.pairing_service.status(&device.context).await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// POST /api/device/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<HeartbeatRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .pairing_service
        .heartbeat(&device.context, body.device_info.as_ref(), body.stats.as_ref())
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "ok".to_string(),
    })))
}

/// POST /api/device/sync/pull
pub async fn sync_pull(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<SyncPullRequest>,
) -> Result<Json<ApiResponse<SyncPullResponse>>, ApiError> {
    let mut pull = state
        .sync_service
        .pull(
            &device.context,
            body.last_sync_time,
            &body.entity_types,
            body.limit,
        )
        .await?;

    Ok(Json(ApiResponse::ok(SyncPullResponse {
        students: pull.entities.remove(&PersonType::Student).unwrap_or_default(),
        guardians: pull.entities.remove(&PersonType::Guardian).unwrap_or_default(),
        has_more: pull.metadata.has_more,
        next_cursor: pull.metadata.next_cursor,
        record_count: pull.metadata.record_count,
        server_time: pull.metadata.server_time,
    })))
}
