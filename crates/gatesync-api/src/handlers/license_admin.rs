//! Admin license management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use gatesync_core::types::pagination::{PageRequest, PageResponse};

use crate::dto::request::{GenerateLicensesRequest, RevokeLicensesRequest};
use crate::dto::response::{ApiResponse, LicenseResponse, RevokeResponse};
use crate::error::ApiError;
use crate::extractors::AdminScope;
use crate::state::AppState;

/// POST /api/admin/licenses/generate
pub async fn generate(
    State(state): State<AppState>,
    scope: AdminScope,
    Json(body): Json<GenerateLicensesRequest>,
) -> Result<Json<ApiResponse<Vec<LicenseResponse>>>, ApiError> {
    let issued = state
        .license_service
        .generate(scope.company_id, body.gate_id, body.quantity)
        .await?;
    Ok(Json(ApiResponse::ok(
        issued.into_iter().map(LicenseResponse::from).collect(),
    )))
}

/// POST /api/admin/licenses/{id}/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    _scope: AdminScope,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LicenseResponse>>, ApiError> {
    let license = state.license_service.regenerate(id).await?;
    Ok(Json(ApiResponse::ok(license.into())))
}

/// POST /api/admin/licenses/revoke
pub async fn revoke(
    State(state): State<AppState>,
    scope: AdminScope,
    Json(body): Json<RevokeLicensesRequest>,
) -> Result<Json<ApiResponse<RevokeResponse>>, ApiError> {
    let revoked = state
        .license_service
        .revoke(scope.company_id, &body.ids)
        .await?;
    Ok(Json(ApiResponse::ok(RevokeResponse { revoked })))
}

/// GET /api/admin/licenses
pub async fn list(
    State(state): State<AppState>,
    scope: AdminScope,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<PageResponse<LicenseResponse>>>, ApiError> {
    let page = PageRequest::new(page.page, page.page_size);
    let licenses = state.license_service.list(scope.company_id, page).await?;
    let items = licenses
        .items
        .into_iter()
        .map(LicenseResponse::from)
        .collect();
    Ok(Json(ApiResponse::ok(PageResponse::new(
        items,
        licenses.page,
        licenses.page_size,
        licenses.total_items,
    ))))
}
