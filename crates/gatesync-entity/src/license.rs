//! Device license entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bearer credential binding one physical device to a gate and company.
///
/// Never hard-deleted; revocation flips `is_deleted`. At most one active
/// [`DeviceConnection`](crate::connection::DeviceConnection) exists per
/// license at any time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceLicense {
    /// Unique license identifier.
    pub id: Uuid,
    /// High-entropy alphanumeric key presented by the device.
    pub license_key: String,
    /// License tier label; currently always `standard`.
    pub license_type: String,
    /// Gate this license is bound to.
    pub gate_id: Uuid,
    /// Owning company (tenant).
    pub company_id: Uuid,
    /// Whether the license is currently active.
    pub is_active: bool,
    /// Soft-delete flag set by revocation.
    pub is_deleted: bool,
    /// First time a device connected with this key (None until first use).
    pub first_used_at: Option<DateTime<Utc>>,
    /// Most recent time a device connected with this key.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl DeviceLicense {
    /// Whether the license may authenticate a device right now.
    ///
    /// Readers re-check this on every request; revocation does not cascade
    /// to terminate an existing connection.
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license(is_active: bool, is_deleted: bool) -> DeviceLicense {
        DeviceLicense {
            id: Uuid::new_v4(),
            license_key: "ABC123".to_string(),
            license_type: "standard".to_string(),
            gate_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            is_active,
            is_deleted,
            first_used_at: None,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_validity_requires_active_and_not_deleted() {
        assert!(license(true, false).is_valid());
        assert!(!license(false, false).is_valid());
        assert!(!license(true, true).is_valid());
        assert!(!license(false, true).is_valid());
    }
}
