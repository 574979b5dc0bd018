//! Guardian push token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A device push token registered for a guardian login session.
///
/// Tokens the provider reports as invalid are pruned opportunistically
/// during fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushToken {
    /// Unique row identifier.
    pub id: Uuid,
    /// Guardian that owns this token.
    pub guardian_id: Uuid,
    /// Provider-issued device token.
    pub token: String,
    /// Client platform label (e.g. "ios", "android").
    pub platform: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last time this token was used for a send.
    pub last_used_at: Option<DateTime<Utc>>,
}
