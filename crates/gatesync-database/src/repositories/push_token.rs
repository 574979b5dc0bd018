//! Push token repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::push_token::PushToken;

/// Repository for guardian device push tokens.
#[derive(Debug, Clone)]
pub struct PushTokenRepository {
    pool: PgPool,
}

impl PushTokenRepository {
    /// Create a new push token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All registered tokens for a guardian.
    pub async fn find_by_guardian(&self, guardian_id: Uuid) -> AppResult<Vec<PushToken>> {
        sqlx::query_as::<_, PushToken>("SELECT * FROM push_tokens WHERE guardian_id = $1")
            .bind(guardian_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tokens", e))
    }

    /// Whether a token is registered for a guardian (socket credential check).
    pub async fn token_belongs_to(&self, guardian_id: Uuid, token: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM push_tokens WHERE guardian_id = $1 AND token = $2",
        )
        .bind(guardian_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check token", e))?;
        Ok(count > 0)
    }

    /// Register or refresh a token for a guardian login session.
    pub async fn upsert(
        &self,
        guardian_id: Uuid,
        token: &str,
        platform: Option<&str>,
    ) -> AppResult<PushToken> {
        sqlx::query_as::<_, PushToken>(
            "INSERT INTO push_tokens (guardian_id, token, platform) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (token) DO UPDATE SET \
                 guardian_id = EXCLUDED.guardian_id, \
                 platform = COALESCE(EXCLUDED.platform, push_tokens.platform), \
                 last_used_at = NOW() \
             RETURNING *",
        )
        .bind(guardian_id)
        .bind(token)
        .bind(platform)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert token", e))
    }

    /// Remove tokens the provider reported as invalid.
    pub async fn prune(&self, tokens: &[String]) -> AppResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM push_tokens WHERE token = ANY($1)")
            .bind(tokens)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to prune tokens", e))?;
        Ok(result.rows_affected())
    }
}
