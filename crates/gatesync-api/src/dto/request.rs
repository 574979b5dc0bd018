//! Request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatesync_entity::person::PersonType;
use gatesync_service::attendance::{BatchRecord, EventDetail};

/// Body of the roster pull endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPullRequest {
    /// Client-held cursor; rows changed after this instant are returned.
    pub last_sync_time: DateTime<Utc>,
    /// Entity types to pull.
    pub entity_types: Vec<PersonType>,
    /// Per-type record cap; clamped server-side.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Body of the batch attendance push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceBatchRequest {
    /// Buffered records to ingest.
    pub records: Vec<BatchRecord>,
}

/// Body of the single check-in/check-out endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecordRequest {
    /// Person the event belongs to.
    pub person_id: Uuid,
    /// Student or guardian.
    pub person_type: PersonType,
    /// Event time; defaults to the server clock when absent.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    /// Optional enrichment fields.
    #[serde(flatten, default)]
    pub detail: EventDetail,
}

/// Body of the downstream attendance pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendancePullRequest {
    /// Creation-time cursor.
    pub last_sync_time: DateTime<Utc>,
    /// Record cap; clamped server-side.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Body of the smart scan endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Raw QR payload, `"<type>:<id>"`.
    pub payload: String,
    /// Scan time from the device clock; defaults to the server clock.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    /// Optional enrichment fields captured at the gate.
    #[serde(flatten, default)]
    pub detail: EventDetail,
}

/// Body of the heartbeat endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Updated device-info blob, when the device wants to refresh it.
    #[serde(default)]
    pub device_info: Option<serde_json::Value>,
    /// Device-reported counters (queue depth, scan counts, and the like).
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

/// Body of the admin license generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLicensesRequest {
    /// Gate the licenses bind to.
    pub gate_id: Uuid,
    /// Number of licenses to issue.
    pub quantity: u32,
}

/// Body of the admin license revocation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeLicensesRequest {
    /// Licenses to soft-delete.
    pub ids: Vec<Uuid>,
}

/// Re-exported so handlers take one import path for connect bodies.
pub use gatesync_service::pairing::ConnectDescriptor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_request_carries_time_and_enrichment() {
        let raw = format!(
            r#"{{"payload":"student:{}","recorded_at":"2024-06-01T08:00:00Z","photo_url":"https://cdn.example/p.jpg","temperature":36.6}}"#,
            Uuid::new_v4()
        );
        let request: ScanRequest = serde_json::from_str(&raw).unwrap();
        assert!(request.recorded_at.is_some());
        assert_eq!(
            request.detail.photo_url.as_deref(),
            Some("https://cdn.example/p.jpg")
        );
        assert_eq!(request.detail.temperature, Some(36.6));
    }

    #[test]
    fn test_scan_request_payload_alone_is_enough() {
        let request: ScanRequest = serde_json::from_str(r#"{"payload":"student:abc"}"#).unwrap();
        assert!(request.recorded_at.is_none());
        assert!(request.detail.photo_url.is_none());
        assert!(request.detail.temperature.is_none());
    }

    #[test]
    fn test_heartbeat_request_accepts_stats() {
        let raw = r#"{"device_info":{"fw":"2.1"},"stats":{"queued":12,"scans_today":340}}"#;
        let request: HeartbeatRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.stats.unwrap()["queued"], 12);

        let bare: HeartbeatRequest = serde_json::from_str("{}").unwrap();
        assert!(bare.stats.is_none());
    }
}
