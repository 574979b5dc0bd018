//! Device license repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_core::types::pagination::PageRequest;
use gatesync_entity::license::DeviceLicense;

/// Repository for device license records.
#[derive(Debug, Clone)]
pub struct LicenseRepository {
    pool: PgPool,
}

impl LicenseRepository {
    /// Create a new license repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a usable license by its key: active and not soft-deleted.
    pub async fn find_valid_by_key(&self, key: &str) -> AppResult<Option<DeviceLicense>> {
        sqlx::query_as::<_, DeviceLicense>(
            "SELECT * FROM device_licenses \
             WHERE license_key = $1 AND is_active = TRUE AND is_deleted = FALSE",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find license by key", e))
    }

    /// Check whether a key already exists (including revoked licenses).
    pub async fn key_exists(&self, key: &str) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM device_licenses WHERE license_key = $1")
                .bind(key)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check key existence", e)
                })?;
        Ok(count > 0)
    }

    /// Create a license bound to a gate and company.
    pub async fn create(
        &self,
        key: &str,
        gate_id: Uuid,
        company_id: Uuid,
    ) -> AppResult<DeviceLicense> {
        sqlx::query_as::<_, DeviceLicense>(
            "INSERT INTO device_licenses (license_key, gate_id, company_id) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(key)
        .bind(gate_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create license", e))
    }

    /// Replace the key of an existing license and forget its usage history.
    pub async fn replace_key(&self, id: Uuid, new_key: &str) -> AppResult<Option<DeviceLicense>> {
        sqlx::query_as::<_, DeviceLicense>(
            "UPDATE device_licenses \
             SET license_key = $2, first_used_at = NULL, last_used_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND is_deleted = FALSE RETURNING *",
        )
        .bind(id)
        .bind(new_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to replace license key", e))
    }

    /// Record usage: set `first_used_at` once and `last_used_at` always.
    pub async fn mark_used(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE device_licenses \
             SET first_used_at = COALESCE(first_used_at, $2), last_used_at = $2, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark license used", e))?;
        Ok(())
    }

    /// Soft-delete a set of licenses. Returns the number revoked.
    pub async fn soft_delete(&self, ids: &[Uuid], company_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE device_licenses \
             SET is_deleted = TRUE, is_active = FALSE, updated_at = NOW() \
             WHERE id = ANY($1) AND company_id = $2 AND is_deleted = FALSE",
        )
        .bind(ids)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke licenses", e))?;
        Ok(result.rows_affected())
    }

    /// List licenses for a company, newest first, paginated.
    pub async fn list_by_company(
        &self,
        company_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<(Vec<DeviceLicense>, u64)> {
        let items = sqlx::query_as::<_, DeviceLicense>(
            "SELECT * FROM device_licenses \
             WHERE company_id = $1 AND is_deleted = FALSE \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(company_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list licenses", e))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM device_licenses WHERE company_id = $1 AND is_deleted = FALSE",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count licenses", e))?;

        Ok((items, total as u64))
    }
}
