//! Attendance handlers for the device surface.

use axum::extract::State;
use axum::Json;

use gatesync_entity::attendance::{AttendanceAction, AttendanceEvent, EventSource};
use gatesync_service::attendance::{AttendanceFeed, BatchManifest, PendingStats};

use crate::dto::request::{
    AttendanceBatchRequest, AttendancePullRequest, AttendanceRecordRequest, ScanRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::PairedDevice;
use crate::state::AppState;

/// POST /api/device/attendance — batch push of buffered events.
pub async fn ingest_batch(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<AttendanceBatchRequest>,
) -> Result<Json<ApiResponse<BatchManifest>>, ApiError> {
    let manifest = state
        .attendance_service
        .ingest_batch(&device.context, &body.records)
        .await?;
    Ok(Json(ApiResponse::ok(manifest)))
}

/// POST /api/device/attendance/check-in
pub async fn check_in(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<AttendanceRecordRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    record(state, device, body, AttendanceAction::CheckIn).await
}

/// POST /api/device/attendance/check-out
pub async fn check_out(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<AttendanceRecordRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    record(state, device, body, AttendanceAction::CheckOut).await
}

async fn record(
    state: AppState,
    device: PairedDevice,
    body: AttendanceRecordRequest,
    action: AttendanceAction,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    let event = state
        .attendance_service
        .record(
            &device.context,
            body.person_id,
            body.person_type,
            action,
            body.recorded_at,
            body.detail,
            EventSource::Direct,
        )
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

/// POST /api/device/scan — smart scan with server-side action resolution.
pub async fn smart_scan(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    let event = state
        .attendance_service
        .smart_scan(&device.context, &body.payload, body.recorded_at, body.detail)
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

/// POST /api/device/attendance/pull — downstream read stream.
pub async fn pull_feed(
    State(state): State<AppState>,
    device: PairedDevice,
    Json(body): Json<AttendancePullRequest>,
) -> Result<Json<ApiResponse<AttendanceFeed>>, ApiError> {
    let feed = state
        .attendance_service
        .pull_feed(&device.context, body.last_sync_time, body.limit)
        .await?;
    Ok(Json(ApiResponse::ok(feed)))
}

/// GET /api/device/attendance/pending
pub async fn pending(
    State(state): State<AppState>,
    device: PairedDevice,
) -> Result<Json<ApiResponse<PendingStats>>, ApiError> {
    let stats = state.attendance_service.pending(&device.context).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
