//! Gate entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A physical checkpoint with one or more scanning devices.
///
/// Owned by the school-administration subsystem; licenses bind to a gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gate {
    /// Unique gate identifier.
    pub id: Uuid,
    /// Owning company (tenant).
    pub company_id: Uuid,
    /// Display name of the owning company, denormalized from the directory.
    pub company_name: String,
    /// Human-readable gate name.
    pub name: String,
    /// Free-form location description.
    pub location: Option<String>,
    /// Whether the gate is active.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
