//! Simplified public surface.
//!
//! Mirrors the device endpoints but validates the license key inline on
//! every call instead of through the shared extractor, so each handler is
//! usable in isolation by thin device firmware.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_entity::attendance::{AttendanceAction, AttendanceEvent, EventSource};
use gatesync_entity::person::{Person, PersonType};
use gatesync_service::attendance::DailyStats;
use gatesync_service::context::DeviceContext;
use gatesync_service::pairing::DeviceStatus;

use crate::dto::request::{
    AttendanceRecordRequest, HeartbeatRequest, ScanRequest, SyncPullRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse, SyncPullResponse, ValidateResponse};
use crate::error::ApiError;
use crate::extractors::auth::LICENSE_KEY_HEADER;
use crate::state::AppState;

/// Per-call key validation shared by every public handler.
async fn device_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<DeviceContext, ApiError> {
    let key = headers
        .get(LICENSE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing license key header"))?;

    let (license, gate) = state
        .license_service
        .validate(key)
        .await
        .map_err(|e| match e.kind {
            ErrorKind::NotFound => AppError::authentication("Invalid license key"),
            _ => e,
        })?;

    let connection = state.connection_repo.find_by_license(license.id).await?;

    Ok(DeviceContext::new(
        license.id,
        connection.map(|c| c.id),
        gate.id,
        license.company_id,
    ))
}

/// GET /api/public/validate
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ValidateResponse>>, ApiError> {
    let key = headers
        .get(LICENSE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing license key header"))?;

    let (license, gate) = state
        .license_service
        .validate(key)
        .await
        .map_err(|e| match e.kind {
            ErrorKind::NotFound => AppError::authentication("Invalid license key"),
            _ => e,
        })?;

    Ok(Json(ApiResponse::ok(ValidateResponse::new(&license, &gate))))
}

/// GET /api/public/status
pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DeviceStatus>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let status = state.pairing_service.status(&ctx).await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// POST /api/public/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<HeartbeatRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    state
        .pairing_service
        .heartbeat(&ctx, body.device_info.as_ref(), body.stats.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "ok".to_string(),
    })))
}

/// POST /api/public/sync
pub async fn sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SyncPullRequest>,
) -> Result<Json<ApiResponse<SyncPullResponse>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let mut pull = state
        .sync_service
        .pull(&ctx, body.last_sync_time, &body.entity_types, body.limit)
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

/// GET /api/public/students
pub async fn students(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Person>>>, ApiError> {
    roster(&state, &headers, PersonType::Student).await
}

/// GET /api/public/guardians
pub async fn guardians(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Person>>>, ApiError> {
    roster(&state, &headers, PersonType::Guardian).await
}

/// Full roster snapshot: a delta pull from the epoch.
async fn roster(
    state: &AppState,
    headers: &HeaderMap,
    person_type: PersonType,
) -> Result<Json<ApiResponse<Vec<Person>>>, ApiError> {
    let ctx = device_context(state, headers).await?;
    let rows = state
        .person_repo
        .sync_delta(
            ctx.company_id,
            person_type,
            DateTime::<Utc>::UNIX_EPOCH,
            state.config.sync.max_pull_limit,
        )
        .await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// POST /api/public/check-in
pub async fn check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AttendanceRecordRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    record(&state, &headers, body, AttendanceAction::CheckIn).await
}

/// POST /api/public/check-out
pub async fn check_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AttendanceRecordRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    record(&state, &headers, body, AttendanceAction::CheckOut).await
}

async fn record(
    state: &AppState,
    headers: &HeaderMap,
    body: AttendanceRecordRequest,
    action: AttendanceAction,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    let ctx = device_context(state, headers).await?;
    let event = state
        .attendance_service
        .record(
            &ctx,
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

/// POST /api/public/scan
pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ApiResponse<AttendanceEvent>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let event = state
        .attendance_service
        .smart_scan(&ctx, &body.payload, body.recorded_at, body.detail)
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

/// GET /api/public/attendance/today
pub async fn attendance_today(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<AttendanceEvent>>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let events = state.attendance_service.today(ctx.company_id).await?;
    Ok(Json(ApiResponse::ok(events)))
}

/// GET /api/public/attendance/checked-in
pub async fn attendance_checked_in(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Uuid>>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let students = state.attendance_service.checked_in(ctx.company_id).await?;
    Ok(Json(ApiResponse::ok(students)))
}

/// GET /api/public/attendance/stats
pub async fn attendance_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DailyStats>>, ApiError> {
    let ctx = device_context(&state, &headers).await?;
    let stats = state.attendance_service.daily_stats(ctx.company_id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
