//! Person repository implementation (roster reads).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::person::{Person, PersonType};

/// Read-side repository over the collaborator-owned person directory.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    /// Create a new person repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a person by type and id, scoped to a company.
    ///
    /// Only active, non-deleted rows resolve.
    pub async fn find_resolvable(
        &self,
        id: Uuid,
        person_type: PersonType,
        company_id: Uuid,
    ) -> AppResult<Option<Person>> {
        sqlx::query_as::<_, Person>(
            "SELECT * FROM persons \
             WHERE id = $1 AND person_type = $2 AND company_id = $3 \
               AND is_active = TRUE AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(person_type)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve person", e))
    }

    /// Incremental roster delta: rows created or updated after the cursor,
    /// ascending by `updated_at`, capped at `limit`.
    pub async fn sync_delta(
        &self,
        company_id: Uuid,
        person_type: PersonType,
        cursor: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Person>> {
        sqlx::query_as::<_, Person>(
            "SELECT * FROM persons \
             WHERE company_id = $1 AND person_type = $2 \
               AND (created_at > $3 OR updated_at > $3) \
             ORDER BY updated_at ASC LIMIT $4",
        )
        .bind(company_id)
        .bind(person_type)
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch sync delta", e))
    }

    /// Count active persons of a type for a company.
    pub async fn count_active(&self, company_id: Uuid, person_type: PersonType) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM persons \
             WHERE company_id = $1 AND person_type = $2 \
               AND is_active = TRUE AND deleted_at IS NULL",
        )
        .bind(company_id)
        .bind(person_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count persons", e))
    }

    /// All guardians linked to a student (fan-out targets).
    pub async fn guardians_of_student(&self, student_id: Uuid) -> AppResult<Vec<Person>> {
        sqlx::query_as::<_, Person>(
            "SELECT p.* FROM persons p \
             JOIN guardian_links gl ON gl.guardian_id = p.id \
             WHERE gl.student_id = $1 AND p.is_active = TRUE AND p.deleted_at IS NULL",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve guardians", e))
    }
}
