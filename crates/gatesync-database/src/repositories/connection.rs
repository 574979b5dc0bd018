//! Device connection repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::connection::DeviceConnection;
use gatesync_entity::person::PersonType;

/// Repository for device connection records.
#[derive(Debug, Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the connection paired to a license.
    pub async fn find_by_license(&self, license_id: Uuid) -> AppResult<Option<DeviceConnection>> {
        sqlx::query_as::<_, DeviceConnection>(
            "SELECT * FROM device_connections WHERE license_id = $1",
        )
        .bind(license_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find connection", e))
    }

    /// Create or refresh the single connection for a license.
    ///
    /// The unique index on `license_id` makes concurrent connect calls
    /// collapse into one row; the conflict arm refreshes device fields and
    /// increments the connection count.
    pub async fn upsert_on_connect(
        &self,
        license_id: Uuid,
        device_name: &str,
        mac_address: Option<&str>,
        ip_address: Option<&str>,
        device_info: &serde_json::Value,
    ) -> AppResult<DeviceConnection> {
        sqlx::query_as::<_, DeviceConnection>(
            "INSERT INTO device_connections \
                 (license_id, device_name, mac_address, ip_address, device_info) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (license_id) DO UPDATE SET \
                 device_name = EXCLUDED.device_name, \
                 mac_address = EXCLUDED.mac_address, \
                 ip_address = EXCLUDED.ip_address, \
                 device_info = EXCLUDED.device_info, \
                 is_connected = TRUE, \
                 last_seen_at = NOW(), \
                 connection_count = device_connections.connection_count + 1, \
                 updated_at = NOW() \
             RETURNING *",
        )
        .bind(license_id)
        .bind(device_name)
        .bind(mac_address)
        .bind(ip_address)
        .bind(device_info)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert connection", e))
    }

    /// Refresh `last_seen_at` and optionally the device-info blob.
    ///
    /// Safe under arbitrary repetition; never touches the connection count.
    pub async fn touch_heartbeat(
        &self,
        connection_id: Uuid,
        device_info: Option<&serde_json::Value>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE device_connections \
             SET last_seen_at = NOW(), is_connected = TRUE, \
                 device_info = COALESCE($2, device_info), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(connection_id)
        .bind(device_info)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record heartbeat", e))?;
        Ok(())
    }

    /// Advance the per-entity-type last-sync watermark.
    pub async fn advance_sync_watermark(
        &self,
        connection_id: Uuid,
        entity_type: PersonType,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let query = match entity_type {
            PersonType::Student => {
                "UPDATE device_connections \
                 SET last_student_sync_at = $2, updated_at = NOW() WHERE id = $1"
            }
            PersonType::Guardian => {
                "UPDATE device_connections \
                 SET last_guardian_sync_at = $2, updated_at = NOW() WHERE id = $1"
            }
        };
        sqlx::query(query)
            .bind(connection_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to advance sync watermark", e)
            })?;
        Ok(())
    }
}
