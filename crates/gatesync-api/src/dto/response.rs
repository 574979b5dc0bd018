//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatesync_entity::connection::DeviceConnection;
use gatesync_entity::gate::Gate;
use gatesync_entity::license::DeviceLicense;
use gatesync_entity::person::Person;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Connect response: the pairing record plus a gate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// The (re)created pairing record.
    pub connection: DeviceConnection,
    /// Gate the license is bound to.
    pub gate: GateSummary,
}

/// Validate response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Always true on a 200; invalid keys are rejected with 401.
    pub valid: bool,
    /// Owning company.
    pub company_id: Uuid,
    /// Company display name for the device UI.
    pub company_name: String,
    /// Gate name for display on the device.
    pub gate_name: String,
    /// Gate identifier.
    pub gate_id: Uuid,
    /// License tier label.
    pub license_type: String,
}

impl ValidateResponse {
    /// Build the response from a validated license and its gate.
    pub fn new(license: &DeviceLicense, gate: &Gate) -> Self {
        Self {
            valid: true,
            company_id: license.company_id,
            company_name: gate.company_name.clone(),
            gate_name: gate.name.clone(),
            gate_id: gate.id,
            license_type: license.license_type.clone(),
        }
    }
}

/// Gate summary embedded in device responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSummary {
    /// Gate identifier.
    pub id: Uuid,
    /// Gate name.
    pub name: String,
    /// Free-form location.
    pub location: Option<String>,
}

impl From<Gate> for GateSummary {
    fn from(gate: Gate) -> Self {
        Self {
            id: gate.id,
            name: gate.name,
            location: gate.location,
        }
    }
}

/// Roster pull response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPullResponse {
    /// Changed students, when requested.
    #[serde(default)]
    pub students: Vec<Person>,
    /// Changed guardians, when requested.
    #[serde(default)]
    pub guardians: Vec<Person>,
    /// True when any entity page was full.
    pub has_more: bool,
    /// Cursor to feed into the next pull.
    pub next_cursor: DateTime<Utc>,
    /// Total records in this response.
    pub record_count: i64,
    /// Server wall clock at response time.
    pub server_time: DateTime<Utc>,
}

/// Issued license summary for the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseResponse {
    /// License identifier.
    pub id: Uuid,
    /// The key the device will present.
    pub license_key: String,
    /// License tier label.
    pub license_type: String,
    /// Bound gate.
    pub gate_id: Uuid,
    /// Whether the license may authenticate right now.
    pub is_active: bool,
    /// First connect time, unset until first use.
    pub first_used_at: Option<DateTime<Utc>>,
    /// Most recent connect time.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<DeviceLicense> for LicenseResponse {
    fn from(license: DeviceLicense) -> Self {
        Self {
            id: license.id,
            license_key: license.license_key,
            license_type: license.license_type,
            gate_id: license.gate_id,
            is_active: license.is_active && !license.is_deleted,
            first_used_at: license.first_used_at,
            last_used_at: license.last_used_at,
            created_at: license.created_at,
        }
    }
}

/// Revocation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeResponse {
    /// Number of licenses revoked.
    pub revoked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license() -> DeviceLicense {
        DeviceLicense {
            id: Uuid::new_v4(),
            license_key: "K7QWERTY".to_string(),
            license_type: "standard".to_string(),
            gate_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            is_active: true,
            is_deleted: false,
            first_used_at: None,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn gate(company_id: Uuid) -> Gate {
        Gate {
            id: Uuid::new_v4(),
            company_id,
            company_name: "Northside Primary".to_string(),
            name: "Main Gate".to_string(),
            location: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_response_carries_company_and_tier() {
        let license = license();
        let gate = gate(license.company_id);
        let response = ValidateResponse::new(&license, &gate);

        assert!(response.valid);
        assert_eq!(response.company_id, license.company_id);
        assert_eq!(response.company_name, "Northside Primary");
        assert_eq!(response.gate_name, "Main Gate");
        assert_eq!(response.license_type, "standard");
    }

    #[test]
    fn test_license_response_masks_deleted_as_inactive() {
        let mut raw = license();
        raw.is_deleted = true;
        let response = LicenseResponse::from(raw);
        assert!(!response.is_active);
        assert_eq!(response.license_type, "standard");
    }
}
