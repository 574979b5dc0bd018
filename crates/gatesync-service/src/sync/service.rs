//! Pull-sync engine for roster data.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gatesync_core::config::sync::SyncConfig;
use gatesync_core::result::AppResult;
use gatesync_database::repositories::connection::ConnectionRepository;
use gatesync_database::repositories::person::PersonRepository;
use gatesync_database::repositories::sync_audit::SyncAuditRepository;
use gatesync_entity::person::{Person, PersonType};

use crate::context::DeviceContext;

/// Audit label for roster pulls.
const ROSTER_PULL: &str = "roster_pull";

/// Per-call sync metadata returned alongside the entity pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMetadata {
    /// Cursor to feed into the next pull.
    ///
    /// The greatest `updated_at` seen across all pages, or the request
    /// cursor unchanged when nothing matched.
    pub next_cursor: DateTime<Utc>,
    /// True when any entity page was full, meaning more rows may remain
    /// behind `next_cursor`.
    pub has_more: bool,
    /// Total records across all entity pages.
    pub record_count: i64,
    /// Server wall clock at response time.
    pub server_time: DateTime<Utc>,
}

/// Result of one pull-sync call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPull {
    /// Changed rows per requested entity type.
    pub entities: HashMap<PersonType, Vec<Person>>,
    /// Cursor and paging metadata.
    pub metadata: SyncMetadata,
}

/// Incremental roster sync over a shared timestamp cursor.
#[derive(Debug, Clone)]
pub struct SyncService {
    persons: Arc<PersonRepository>,
    connections: Arc<ConnectionRepository>,
    audits: Arc<SyncAuditRepository>,
    config: SyncConfig,
}

impl SyncService {
    /// Creates a new sync service.
    pub fn new(
        persons: Arc<PersonRepository>,
        connections: Arc<ConnectionRepository>,
        audits: Arc<SyncAuditRepository>,
        config: SyncConfig,
    ) -> Self {
        Self {
            persons,
            connections,
            audits,
            config,
        }
    }

    /// Pull roster changes newer than `cursor` for the requested entity types.
    ///
    /// Every call is wrapped in a SyncAudit envelope: the row opens as
    /// in-progress and closes as success with the aggregate count, or as
    /// failed with the error text. The per-entity-type watermark on the
    /// connection advances only when that type returned at least one row.
    pub async fn pull(
        &self,
        ctx: &DeviceContext,
        cursor: DateTime<Utc>,
        entity_types: &[PersonType],
        limit: Option<i64>,
    ) -> AppResult<RosterPull> {
        let connection_id = ctx.require_connection()?;
        let limit = clamp_limit(limit, &self.config);

        let entity_type = match entity_types {
            [single] => Some(*single),
            _ => None,
        };
        let audit = self
            .audits
            .start(connection_id, ROSTER_PULL, entity_type)
            .await?;

        match self.pull_inner(ctx, connection_id, cursor, entity_types, limit).await {
            Ok(pull) => {
                self.audits
                    .complete(audit.id, pull.metadata.record_count)
                    .await?;
                info!(
                    connection_id = %connection_id,
                    records = pull.metadata.record_count,
                    has_more = pull.metadata.has_more,
                    "Roster pull completed"
                );
                Ok(pull)
            }
            Err(e) => {
                if let Err(audit_err) = self.audits.fail(audit.id, &e.to_string()).await {
                    warn!(
                        audit_id = %audit.id,
                        error = %audit_err,
                        "Failed to close sync audit as failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn pull_inner(
        &self,
        ctx: &DeviceContext,
        connection_id: uuid::Uuid,
        cursor: DateTime<Utc>,
        entity_types: &[PersonType],
        limit: i64,
    ) -> AppResult<RosterPull> {
        let mut entities = HashMap::new();
        let mut record_count: i64 = 0;
        let mut has_more = false;
        let mut next_cursor = cursor;
        let now = Utc::now();

        for &entity_type in entity_types {
            let rows = self
                .persons
                .sync_delta(ctx.company_id, entity_type, cursor, limit)
                .await?;

            record_count += rows.len() as i64;
            if rows.len() as i64 == limit {
                has_more = true;
            }
            next_cursor = advance_cursor(next_cursor, &rows);
            if !rows.is_empty() {
                self.connections
                    .advance_sync_watermark(connection_id, entity_type, now)
                    .await?;
            }
            entities.insert(entity_type, rows);
        }

        Ok(RosterPull {
            entities,
            metadata: SyncMetadata {
                next_cursor,
                has_more,
                record_count,
                server_time: now,
            },
        })
    }
}

/// Fold one entity page into the running cursor.
///
/// Returns the greatest `updated_at` across the rows, never moving the
/// cursor backwards; an empty page leaves it unchanged.
fn advance_cursor(current: DateTime<Utc>, rows: &[Person]) -> DateTime<Utc> {
    rows.iter()
        .map(|p| p.updated_at)
        .max()
        .map_or(current, |newest| newest.max(current))
}

/// Clamp a device-supplied limit into `[1, max_pull_limit]`, falling back
/// to the configured default when absent or non-positive.
fn clamp_limit(limit: Option<i64>, config: &SyncConfig) -> i64 {
    match limit {
        Some(n) if n > 0 => n.min(config.max_pull_limit),
        _ => config.default_pull_limit.min(config.max_pull_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn person(updated_at: DateTime<Utc>) -> Person {
        Person {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            person_type: PersonType::Student,
            full_name: "Riley Okafor".to_string(),
            code: "S-042".to_string(),
            is_active: true,
            deleted_at: None,
            created_at: updated_at,
            updated_at,
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_page_keeps_request_cursor() {
        let cursor = at(9, 0);
        assert_eq!(advance_cursor(cursor, &[]), cursor);
    }

    #[test]
    fn test_partial_page_advances_to_newest_row() {
        let cursor = at(9, 0);
        let rows = vec![person(at(9, 15)), person(at(10, 30)), person(at(9, 45))];
        assert_eq!(advance_cursor(cursor, &rows), at(10, 30));
    }

    #[test]
    fn test_full_page_of_stale_rows_never_moves_cursor_backwards() {
        let cursor = at(12, 0);
        let rows: Vec<Person> = (0..3).map(|m| person(at(9, m))).collect();
        assert_eq!(advance_cursor(cursor, &rows), cursor);
    }

    fn config() -> SyncConfig {
        SyncConfig {
            max_pull_limit: 5000,
            default_pull_limit: 500,
        }
    }

    #[test]
    fn test_clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(Some(100_000), &config()), 5000);
    }

    #[test]
    fn test_clamp_limit_passes_reasonable_values() {
        assert_eq!(clamp_limit(Some(250), &config()), 250);
        assert_eq!(clamp_limit(Some(5000), &config()), 5000);
    }

    #[test]
    fn test_clamp_limit_defaults_when_absent_or_invalid() {
        assert_eq!(clamp_limit(None, &config()), 500);
        assert_eq!(clamp_limit(Some(0), &config()), 500);
        assert_eq!(clamp_limit(Some(-3), &config()), 500);
    }
}
