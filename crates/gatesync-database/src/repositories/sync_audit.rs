//! Sync audit repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::person::PersonType;
use gatesync_entity::sync_audit::SyncAudit;

/// Repository for append-only sync audit rows.
#[derive(Debug, Clone)]
pub struct SyncAuditRepository {
    pool: PgPool,
}

impl SyncAuditRepository {
    /// Create a new sync audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open an audit row in the in-progress state.
    pub async fn start(
        &self,
        connection_id: Uuid,
        sync_type: &str,
        entity_type: Option<PersonType>,
    ) -> AppResult<SyncAudit> {
        sqlx::query_as::<_, SyncAudit>(
            "INSERT INTO sync_audits (connection_id, sync_type, entity_type) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(connection_id)
        .bind(sync_type)
        .bind(entity_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open sync audit", e))
    }

    /// Close an audit row as successful with the aggregate record count.
    pub async fn complete(&self, audit_id: Uuid, record_count: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE sync_audits \
             SET status = 'success', record_count = $2, completed_at = NOW() \
             WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(audit_id)
        .bind(record_count)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete sync audit", e))?;
        Ok(())
    }

    /// Close an audit row as failed with the error text.
    pub async fn fail(&self, audit_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE sync_audits \
             SET status = 'failed', error_message = $2, completed_at = NOW() \
             WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(audit_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fail sync audit", e))?;
        Ok(())
    }
}
