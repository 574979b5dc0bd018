//! Gate directory repository (collaborator-owned, read here).

use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::gate::Gate;

/// Read-side repository over the gate directory.
#[derive(Debug, Clone)]
pub struct GateRepository {
    pool: PgPool,
}

impl GateRepository {
    /// Create a new gate repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a gate by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Gate>> {
        sqlx::query_as::<_, Gate>("SELECT * FROM gates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find gate", e))
    }

    /// Find an active gate owned by a company.
    pub async fn find_owned(&self, id: Uuid, company_id: Uuid) -> AppResult<Option<Gate>> {
        sqlx::query_as::<_, Gate>(
            "SELECT * FROM gates WHERE id = $1 AND company_id = $2 AND is_active = TRUE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find owned gate", e))
    }
}
