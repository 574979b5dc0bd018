//! Device pairing operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use gatesync_core::config::device::DeviceConfig;
use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;
use gatesync_database::repositories::connection::ConnectionRepository;
use gatesync_database::repositories::gate::GateRepository;
use gatesync_database::repositories::license::LicenseRepository;
use gatesync_database::repositories::person::PersonRepository;
use gatesync_entity::connection::DeviceConnection;
use gatesync_entity::gate::Gate;
use gatesync_entity::license::DeviceLicense;
use gatesync_entity::person::PersonType;

use crate::context::DeviceContext;

/// Device-reported descriptor sent on connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectDescriptor {
    /// Device display name.
    pub device_name: String,
    /// MAC address.
    #[serde(default)]
    pub mac_address: Option<String>,
    /// IP address.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Opaque device-info blob.
    #[serde(default)]
    pub device_info: serde_json::Value,
}

/// Snapshot returned by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Watermark of the last student roster sync.
    pub last_student_sync: Option<DateTime<Utc>>,
    /// Watermark of the last guardian roster sync.
    pub last_guardian_sync: Option<DateTime<Utc>>,
    /// Active students in the company scope.
    pub total_students: i64,
    /// Active guardians in the company scope.
    pub total_guardians: i64,
    /// Device name from the pairing record.
    pub device_name: String,
    /// Whether the device currently reports as connected.
    pub is_connected: bool,
}

/// Manages the single active connection per license.
#[derive(Debug, Clone)]
pub struct PairingService {
    licenses: Arc<LicenseRepository>,
    connections: Arc<ConnectionRepository>,
    persons: Arc<PersonRepository>,
    gates: Arc<GateRepository>,
    config: DeviceConfig,
}

impl PairingService {
    /// Creates a new pairing service.
    pub fn new(
        licenses: Arc<LicenseRepository>,
        connections: Arc<ConnectionRepository>,
        persons: Arc<PersonRepository>,
        gates: Arc<GateRepository>,
        config: DeviceConfig,
    ) -> Self {
        Self {
            licenses,
            connections,
            persons,
            gates,
            config,
        }
    }

    /// Pair a device to its license.
    ///
    /// Creates the connection on first use, otherwise refreshes it and
    /// increments the connection count. Sets the license `first_used_at`
    /// once and `last_used_at` on every call.
    pub async fn connect(
        &self,
        key: &str,
        descriptor: &ConnectDescriptor,
    ) -> AppResult<(DeviceConnection, DeviceLicense, Gate)> {
        let license = self
            .licenses
            .find_valid_by_key(key)
            .await?
            .ok_or_else(|| AppError::not_found("License not found"))?;

        let gate = self
            .gates
            .find_by_id(license.gate_id)
            .await?
            .ok_or_else(|| AppError::not_found("Gate for license not found"))?;

        let connection = self
            .connections
            .upsert_on_connect(
                license.id,
                &descriptor.device_name,
                descriptor.mac_address.as_deref(),
                descriptor.ip_address.as_deref(),
                &descriptor.device_info,
            )
            .await?;

        self.licenses.mark_used(license.id, Utc::now()).await?;

        info!(
            license_id = %license.id,
            connection_id = %connection.id,
            device_name = %descriptor.device_name,
            connection_count = connection.connection_count,
            "Device connected"
        );

        Ok((connection, license, gate))
    }

    /// Idempotent liveness refresh; safe under arbitrary repetition.
    ///
    /// Device-reported counters ride along for operational visibility but
    /// are not persisted; the connection row only tracks liveness.
    pub async fn heartbeat(
        &self,
        ctx: &DeviceContext,
        device_info: Option<&serde_json::Value>,
        stats: Option<&serde_json::Value>,
    ) -> AppResult<()> {
        let connection_id = ctx.require_connection()?;
        if let Some(stats) = stats {
            info!(connection_id = %connection_id, stats = %stats, "Device heartbeat stats");
        }
        self.connections
            .touch_heartbeat(connection_id, device_info)
            .await
    }

    /// Current pairing and roster snapshot for the device.
    ///
    /// A connection that has not been heard from within the staleness
    /// window reports as disconnected even if it never said goodbye.
    pub async fn status(&self, ctx: &DeviceContext) -> AppResult<DeviceStatus> {
        let connection = self
            .connections
            .find_by_license(ctx.license_id)
            .await?
            .ok_or_else(|| AppError::not_found("Device has not connected yet"))?;

        let total_students = self
            .persons
            .count_active(ctx.company_id, PersonType::Student)
            .await?;
        let total_guardians = self
            .persons
            .count_active(ctx.company_id, PersonType::Guardian)
            .await?;

        let is_connected = connection.is_connected
            && !connection.is_stale(ctx.request_time, self.config.heartbeat_stale_seconds);

        Ok(DeviceStatus {
            last_student_sync: connection.last_student_sync_at,
            last_guardian_sync: connection.last_guardian_sync_at,
            total_students,
            total_guardians,
            device_name: connection.device_name,
            is_connected,
        })
    }
}
