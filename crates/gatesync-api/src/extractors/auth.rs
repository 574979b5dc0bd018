//! Credential extractors for the device and admin surfaces.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use gatesync_core::error::AppError;
use gatesync_service::context::DeviceContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the device license key.
pub const LICENSE_KEY_HEADER: &str = "x-license-key";

/// Header carrying the admin company scope.
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// Authenticated device, extracted from the license-key header.
///
/// The key is re-validated on every request, so revocation takes effect
/// immediately even for already-paired devices. The connection id is
/// absent until the device has called connect.
#[derive(Debug, Clone)]
pub struct DeviceAuth {
    /// Request-scoped context carrying the company scope.
    pub context: DeviceContext,
    /// The raw key, needed again by the connect handler.
    pub license_key: String,
}

impl std::ops::Deref for DeviceAuth {
    type Target = DeviceContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl FromRequestParts<AppState> for DeviceAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(LICENSE_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing license key header"))?
            .to_string();

        let (license, gate) = state
            .license_service
            .validate(&key)
            .await
            .map_err(|e| match e.kind {
                // An unknown key on the auth boundary is a credential
                // failure, not a lookup miss.
                gatesync_core::error::ErrorKind::NotFound => {
                    AppError::authentication("Invalid license key")
                }
                _ => e,
            })?;

        let connection = state.connection_repo.find_by_license(license.id).await?;

        let context = DeviceContext::new(
            license.id,
            connection.map(|c| c.id),
            gate.id,
            license.company_id,
        );

        Ok(DeviceAuth {
            context,
            license_key: key,
        })
    }
}

/// Authenticated and paired device.
///
/// Everything `DeviceAuth` checks, plus a live pairing record. Endpoints
/// other than connect and validate require one; a validated key that has
/// never called connect is rejected with 401 rather than allowed through
/// with an absent connection.
#[derive(Debug, Clone)]
pub struct PairedDevice {
    /// Request-scoped context; `connection_id` is always present.
    pub context: DeviceContext,
    /// The live pairing record id.
    pub connection_id: Uuid,
}

impl std::ops::Deref for PairedDevice {
    type Target = DeviceContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl FromRequestParts<AppState> for PairedDevice {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = DeviceAuth::from_request_parts(parts, state).await?;
        let connection_id = require_paired(&auth.context)?;
        Ok(PairedDevice {
            context: auth.context,
            connection_id,
        })
    }
}

/// Reject contexts without a pairing record as a credential failure.
fn require_paired(context: &DeviceContext) -> Result<Uuid, AppError> {
    context
        .connection_id
        .ok_or_else(|| AppError::authentication("Device is not paired; call connect first"))
}

/// Admin company scope from the `x-company-id` header.
///
/// Staff identity and authorization live in a collaborator system; this
/// boundary only needs the tenant every admin query is scoped to.
#[derive(Debug, Clone, Copy)]
pub struct AdminScope {
    /// Company all admin operations are scoped to.
    pub company_id: Uuid,
}

impl<S: Send + Sync> FromRequestParts<S> for AdminScope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(COMPANY_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing company scope header"))?;

        let company_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::validation("Company scope header is not a valid UUID"))?;

        Ok(AdminScope { company_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesync_core::error::ErrorKind;

    fn context(connection_id: Option<Uuid>) -> DeviceContext {
        DeviceContext::new(Uuid::new_v4(), connection_id, Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_unpaired_context_rejected_as_credential_failure() {
        let err = require_paired(&context(None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_paired_context_passes_through() {
        let id = Uuid::new_v4();
        assert_eq!(require_paired(&context(Some(id))).unwrap(), id);
    }
}
