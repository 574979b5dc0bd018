//! Guardian notification repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::notification::GuardianNotification;

/// Repository for the durable guardian inbox.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an inbox row for a guardian.
    pub async fn create(
        &self,
        guardian_id: Uuid,
        title: &str,
        body: &str,
        attendance_event_id: Option<Uuid>,
    ) -> AppResult<GuardianNotification> {
        sqlx::query_as::<_, GuardianNotification>(
            "INSERT INTO guardian_notifications (guardian_id, title, body, attendance_event_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(guardian_id)
        .bind(title)
        .bind(body)
        .bind(attendance_event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }
}
