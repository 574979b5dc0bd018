//! Sync audit entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::person::PersonType;

/// Lifecycle status of a sync audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sync_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The pull is still running.
    InProgress,
    /// The pull completed and the record count is final.
    Success,
    /// The pull aborted; `error_message` holds the cause.
    Failed,
}

/// One append-only row per pull-sync call, for per-device forensics.
///
/// Immutable once `status` leaves `InProgress`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncAudit {
    /// Unique audit row identifier.
    pub id: Uuid,
    /// Connection that performed the sync.
    pub connection_id: Uuid,
    /// Sync type label (e.g. "roster_pull", "attendance_pull").
    pub sync_type: String,
    /// Entity type synced, when the sync targets one.
    pub entity_type: Option<PersonType>,
    /// Aggregate number of records returned.
    pub record_count: i64,
    /// Current lifecycle status.
    pub status: SyncStatus,
    /// When the sync started.
    pub started_at: DateTime<Utc>,
    /// When the sync finished (None while in progress).
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure cause, when `status` is `Failed`.
    pub error_message: Option<String>,
}
