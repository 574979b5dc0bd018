//! Request context carrying the authenticated device and its company scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated device request.
///
/// Extracted once per request and passed into service methods so the
/// company scope travels explicitly with the call. Never stored in shared
/// mutable state; a new value is built for every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceContext {
    /// The license that authenticated the request.
    pub license_id: Uuid,
    /// The paired connection, when one exists (absent only on connect/validate).
    pub connection_id: Option<Uuid>,
    /// Gate the license is bound to.
    pub gate_id: Uuid,
    /// Company scope for every query made during this request.
    pub company_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl DeviceContext {
    /// Creates a new device context.
    pub fn new(
        license_id: Uuid,
        connection_id: Option<Uuid>,
        gate_id: Uuid,
        company_id: Uuid,
    ) -> Self {
        Self {
            license_id,
            connection_id,
            gate_id,
            company_id,
            request_time: Utc::now(),
        }
    }

    /// The paired connection id, or an error for endpoints that demand one.
    pub fn require_connection(&self) -> Result<Uuid, gatesync_core::error::AppError> {
        self.connection_id.ok_or_else(|| {
            gatesync_core::error::AppError::authentication("Device has not connected yet")
        })
    }
}
