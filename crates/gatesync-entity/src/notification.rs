//! Guardian inbox notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A durable in-app notification row.
///
/// This is the system of record for the guardian's inbox; push delivery is
/// a best-effort nudge layered on top of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuardianNotification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// Guardian this notification belongs to.
    pub guardian_id: Uuid,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Attendance event that produced this notification, when applicable.
    pub attendance_event_id: Option<Uuid>,
    /// Whether the guardian has read the notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
