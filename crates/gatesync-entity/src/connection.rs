//! Device connection entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The live pairing record of the device currently holding a license.
///
/// Logically 1:1 with [`DeviceLicense`](crate::license::DeviceLicense),
/// enforced by a unique index on `license_id`. Recreated or updated on
/// every connect call.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceConnection {
    /// Unique connection identifier.
    pub id: Uuid,
    /// License this connection belongs to.
    pub license_id: Uuid,
    /// Device-reported name.
    pub device_name: String,
    /// Device MAC address.
    pub mac_address: Option<String>,
    /// Device IP address at last connect.
    pub ip_address: Option<String>,
    /// Opaque device-info blob (model, firmware, etc.).
    pub device_info: serde_json::Value,
    /// Whether the device currently reports as connected.
    pub is_connected: bool,
    /// Last heartbeat or request time.
    pub last_seen_at: DateTime<Utc>,
    /// Number of connect calls over the lifetime of the pairing.
    pub connection_count: i32,
    /// Watermark of the last successful student roster sync.
    pub last_student_sync_at: Option<DateTime<Utc>>,
    /// Watermark of the last successful guardian roster sync.
    pub last_guardian_sync_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl DeviceConnection {
    /// Whether the connection has gone silent for longer than `stale_seconds`.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_seconds: i64) -> bool {
        (now - self.last_seen_at).num_seconds() > stale_seconds
    }
}
