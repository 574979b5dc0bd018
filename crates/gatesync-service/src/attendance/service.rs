//! Attendance ingestion into the append-only ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use gatesync_core::config::attendance::AttendanceConfig;
use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;
use gatesync_database::repositories::attendance::{AttendanceRepository, NewAttendanceEvent};
use gatesync_database::repositories::person::PersonRepository;
use gatesync_database::repositories::sync_audit::SyncAuditRepository;
use gatesync_entity::attendance::{AttendanceAction, AttendanceEvent, EventSource};
use gatesync_entity::person::PersonType;
use gatesync_realtime::fanout::AttendanceFanout;

use crate::context::DeviceContext;

use super::scan::{day_bounds, ScanPayload};

/// Audit label for downstream attendance pulls.
const ATTENDANCE_PULL: &str = "attendance_pull";

/// Optional enrichment fields on an attendance submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetail {
    /// Free-form location label.
    #[serde(default)]
    pub location: Option<String>,
    /// Photo captured at the gate.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Body temperature reading.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// One record in a batch push from an offline-capable device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Device-side record identifier, echoed back in the manifest.
    #[serde(default = "Uuid::new_v4")]
    pub record_id: Uuid,
    /// Person the event belongs to.
    pub person_id: Uuid,
    /// Whether the person is a student or guardian.
    pub person_type: PersonType,
    /// Check-in or check-out.
    pub action: AttendanceAction,
    /// Device-clock timestamp of the buffered event.
    pub recorded_at: DateTime<Utc>,
    /// Optional enrichment fields.
    #[serde(flatten, default)]
    pub detail: EventDetail,
}

/// Per-record batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Persisted to the ledger.
    Accepted,
    /// Already applied within the dedup window; safe for the device to drop.
    DuplicateSkipped,
    /// Genuinely rejected; the reason says why.
    Rejected(String),
}

/// One record's identity plus its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResult {
    /// Device-side record identifier.
    pub record_id: Uuid,
    /// What happened to the record.
    pub outcome: RecordOutcome,
}

/// Batch response manifest.
///
/// The aggregate counters and id lists mirror what resyncing devices
/// already consume; duplicates count under `failed` there. The `outcomes`
/// list is the authoritative per-record story and distinguishes
/// "already applied" from "genuinely rejected".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    /// Records received in the request.
    pub received: usize,
    /// Records persisted.
    pub processed: usize,
    /// Records not persisted (duplicates plus rejections).
    pub failed: usize,
    /// Ids of persisted records.
    pub processed_record_ids: Vec<Uuid>,
    /// Ids of records not persisted.
    pub failed_record_ids: Vec<Uuid>,
    /// Tagged per-record outcomes.
    pub outcomes: Vec<RecordResult>,
    /// Server wall clock at response time.
    pub server_time: DateTime<Utc>,
}

/// Page of the downstream attendance read stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceFeed {
    /// Events created after the cursor, ascending by creation time.
    pub records: Vec<AttendanceEvent>,
    /// True when the page was full and more rows may remain.
    pub has_more: bool,
    /// Server wall clock at response time.
    pub server_time: DateTime<Utc>,
}

/// Never-pulled backlog summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingStats {
    /// Events never returned by the read stream.
    pub pending_count: i64,
    /// Creation time of the oldest pending event.
    pub oldest_pending_time: Option<DateTime<Utc>>,
}

/// Daily attendance aggregate for a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    /// Check-in events today.
    pub check_ins: i64,
    /// Check-out events today.
    pub check_outs: i64,
    /// Distinct persons with at least one event today.
    pub unique_persons: i64,
}

/// Writes the attendance ledger and triggers guardian fan-out.
#[derive(Debug, Clone)]
pub struct AttendanceService {
    events: Arc<AttendanceRepository>,
    persons: Arc<PersonRepository>,
    audits: Arc<SyncAuditRepository>,
    fanout: Arc<AttendanceFanout>,
    config: AttendanceConfig,
}

impl AttendanceService {
    /// Creates a new attendance service.
    pub fn new(
        events: Arc<AttendanceRepository>,
        persons: Arc<PersonRepository>,
        audits: Arc<SyncAuditRepository>,
        fanout: Arc<AttendanceFanout>,
        config: AttendanceConfig,
    ) -> Self {
        Self {
            events,
            persons,
            audits,
            fanout,
            config,
        }
    }

    /// Record a single trusted event.
    ///
    /// Appends unconditionally; single scans are trusted and skip the
    /// duplicate window. Student events fan out to guardians inline, and a
    /// fan-out failure never fails the write.
    pub async fn record(
        &self,
        ctx: &DeviceContext,
        person_id: Uuid,
        person_type: PersonType,
        action: AttendanceAction,
        recorded_at: Option<DateTime<Utc>>,
        detail: EventDetail,
        source: EventSource,
    ) -> AppResult<AttendanceEvent> {
        let person = self
            .persons
            .find_resolvable(person_id, person_type, ctx.company_id)
            .await?
            .ok_or_else(|| AppError::not_found("Person not found"))?;

        let event = NewAttendanceEvent {
            person_id,
            person_type,
            action,
            recorded_at: recorded_at.unwrap_or(ctx.request_time),
            license_id: Some(ctx.license_id),
            gate_id: Some(ctx.gate_id),
            company_id: ctx.company_id,
            location: detail.location,
            photo_url: detail.photo_url,
            temperature: detail.temperature,
            source,
        };
        let event = self
            .events
            .insert(&event, self.config.dedup_window_seconds)
            .await?
            .ok_or_else(|| AppError::conflict("Duplicate attendance event"))?;

        info!(
            event_id = %event.id,
            person_id = %person_id,
            action = %action,
            "Attendance event recorded"
        );

        if person_type == PersonType::Student {
            self.fanout.dispatch(&event, &person.full_name).await;
        }
        Ok(event)
    }

    /// Resolve a raw QR scan and record the alternation-derived event.
    ///
    /// The action flips between check-in and check-out per person per day,
    /// starting from check-in; the scan time (device clock when supplied)
    /// decides which day the alternation runs over. Student scans go
    /// through the full pipeline so fan-out fires; guardian scans only
    /// write the ledger.
    pub async fn smart_scan(
        &self,
        ctx: &DeviceContext,
        raw: &str,
        recorded_at: Option<DateTime<Utc>>,
        detail: EventDetail,
    ) -> AppResult<AttendanceEvent> {
        let payload = ScanPayload::parse(raw)?;
        let scanned_at = recorded_at.unwrap_or(ctx.request_time);
        let (day_start, day_end) = day_bounds(scanned_at);
        let last = self
            .events
            .last_action_between(payload.person_id, day_start, day_end)
            .await?;
        let action = AttendanceAction::next_after(last);

        self.record(
            ctx,
            payload.person_id,
            payload.person_type,
            action,
            recorded_at,
            detail,
            EventSource::Scan,
        )
        .await
    }

    /// Ingest a batch of buffered events from a resyncing device.
    ///
    /// Records are independent: one failing never aborts the rest, and the
    /// manifest always comes back so the device can retry safely. A record
    /// is a duplicate when the same (person, action) was persisted within
    /// the dedup window, caught either by the lookback query or by the
    /// bucket unique index at insert time.
    pub async fn ingest_batch(
        &self,
        ctx: &DeviceContext,
        records: &[BatchRecord],
    ) -> AppResult<BatchManifest> {
        if records.len() > self.config.max_batch_records {
            return Err(AppError::validation(format!(
                "batch exceeds {} records",
                self.config.max_batch_records
            )));
        }

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.ingest_one(ctx, record).await;
            outcomes.push(RecordResult {
                record_id: record.record_id,
                outcome,
            });
        }

        let manifest = build_manifest(outcomes, Utc::now());
        info!(
            received = manifest.received,
            processed = manifest.processed,
            failed = manifest.failed,
            "Batch ingested"
        );
        Ok(manifest)
    }

    async fn ingest_one(&self, ctx: &DeviceContext, record: &BatchRecord) -> RecordOutcome {
        let person = match self
            .persons
            .find_resolvable(record.person_id, record.person_type, ctx.company_id)
            .await
        {
            Ok(Some(p)) => p,
            Ok(None) => return RecordOutcome::Rejected("person not found".to_string()),
            Err(e) => {
                warn!(record_id = %record.record_id, error = %e, "Batch record lookup failed");
                return RecordOutcome::Rejected(e.to_string());
            }
        };

        // Lookback query first. The bucket unique index below closes the
        // read-then-write race; this catches near-duplicates that straddle
        // a bucket edge.
        match self
            .events
            .exists_recent_duplicate(
                record.person_id,
                record.action,
                record.recorded_at,
                self.config.dedup_window_seconds,
            )
            .await
        {
            Ok(true) => return RecordOutcome::DuplicateSkipped,
            Ok(false) => {}
            Err(e) => {
                warn!(record_id = %record.record_id, error = %e, "Duplicate check failed");
                return RecordOutcome::Rejected(e.to_string());
            }
        }

        let event = NewAttendanceEvent {
            person_id: record.person_id,
            person_type: record.person_type,
            action: record.action,
            recorded_at: record.recorded_at,
            license_id: Some(ctx.license_id),
            gate_id: Some(ctx.gate_id),
            company_id: ctx.company_id,
            location: record.detail.location.clone(),
            photo_url: record.detail.photo_url.clone(),
            temperature: record.detail.temperature,
            source: EventSource::Batch,
        };
        match self
            .events
            .insert(&event, self.config.dedup_window_seconds)
            .await
        {
            Ok(Some(event)) => {
                if record.person_type == PersonType::Student {
                    self.fanout.dispatch(&event, &person.full_name).await;
                }
                RecordOutcome::Accepted
            }
            Ok(None) => RecordOutcome::DuplicateSkipped,
            Err(e) => {
                warn!(record_id = %record.record_id, error = %e, "Batch record insert failed");
                RecordOutcome::Rejected(e.to_string())
            }
        }
    }

    /// Downstream read stream: events created after the cursor.
    ///
    /// Returned rows are marked pulled (first pull wins). Every call gets
    /// a SyncAudit envelope like the roster pull.
    pub async fn pull_feed(
        &self,
        ctx: &DeviceContext,
        cursor: DateTime<Utc>,
        limit: Option<i64>,
    ) -> AppResult<AttendanceFeed> {
        let connection_id = ctx.require_connection()?;
        let limit = match limit {
            Some(n) if n > 0 => n.min(self.config.max_pull_limit),
            _ => self.config.max_pull_limit,
        };

        let audit = self.audits.start(connection_id, ATTENDANCE_PULL, None).await?;
        let result = self.pull_feed_inner(ctx, cursor, limit).await;
        match &result {
            Ok(feed) => {
                self.audits
                    .complete(audit.id, feed.records.len() as i64)
                    .await?;
            }
            Err(e) => {
                if let Err(audit_err) = self.audits.fail(audit.id, &e.to_string()).await {
                    warn!(audit_id = %audit.id, error = %audit_err, "Failed to close audit");
                }
            }
        }
        result
    }

    async fn pull_feed_inner(
        &self,
        ctx: &DeviceContext,
        cursor: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<AttendanceFeed> {
        let records = self
            .events
            .pull_after(ctx.company_id, cursor, limit)
            .await?;
        let has_more = records.len() as i64 == limit;

        if !records.is_empty() {
            let ids: Vec<Uuid> = records.iter().map(|e| e.id).collect();
            self.events.mark_pulled(&ids, Utc::now()).await?;
        }

        Ok(AttendanceFeed {
            records,
            has_more,
            server_time: Utc::now(),
        })
    }

    /// Never-pulled backlog summary for the company.
    pub async fn pending(&self, ctx: &DeviceContext) -> AppResult<PendingStats> {
        let (pending_count, oldest_pending_time) =
            self.events.pending_stats(ctx.company_id).await?;
        Ok(PendingStats {
            pending_count,
            oldest_pending_time,
        })
    }

    /// All of today's events for a company.
    pub async fn today(&self, company_id: Uuid) -> AppResult<Vec<AttendanceEvent>> {
        let (day_start, day_end) = day_bounds(Utc::now());
        self.events
            .events_between(company_id, day_start, day_end)
            .await
    }

    /// Students whose latest event today is a check-in.
    pub async fn checked_in(&self, company_id: Uuid) -> AppResult<Vec<Uuid>> {
        let (day_start, day_end) = day_bounds(Utc::now());
        self.events
            .currently_checked_in(company_id, day_start, day_end)
            .await
    }

    /// Today's aggregate counters for a company.
    pub async fn daily_stats(&self, company_id: Uuid) -> AppResult<DailyStats> {
        let (day_start, day_end) = day_bounds(Utc::now());
        let (check_ins, check_outs, unique_persons) = self
            .events
            .daily_stats(company_id, day_start, day_end)
            .await?;
        Ok(DailyStats {
            check_ins,
            check_outs,
            unique_persons,
        })
    }
}

/// Fold per-record outcomes into the manifest the device consumes.
fn build_manifest(outcomes: Vec<RecordResult>, server_time: DateTime<Utc>) -> BatchManifest {
    let received = outcomes.len();
    let mut processed_record_ids = Vec::new();
    let mut failed_record_ids = Vec::new();
    for result in &outcomes {
        match result.outcome {
            RecordOutcome::Accepted => processed_record_ids.push(result.record_id),
            RecordOutcome::DuplicateSkipped | RecordOutcome::Rejected(_) => {
                failed_record_ids.push(result.record_id)
            }
        }
    }
    BatchManifest {
        received,
        processed: processed_record_ids.len(),
        failed: failed_record_ids.len(),
        processed_record_ids,
        failed_record_ids,
        outcomes,
        server_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: RecordOutcome) -> RecordResult {
        RecordResult {
            record_id: Uuid::new_v4(),
            outcome,
        }
    }

    #[test]
    fn test_manifest_counts_duplicates_as_failed() {
        let outcomes = vec![
            result(RecordOutcome::Accepted),
            result(RecordOutcome::DuplicateSkipped),
            result(RecordOutcome::Rejected("person not found".to_string())),
        ];
        let manifest = build_manifest(outcomes, Utc::now());

        assert_eq!(manifest.received, 3);
        assert_eq!(manifest.processed, 1);
        assert_eq!(manifest.failed, 2);
        assert_eq!(manifest.processed_record_ids.len(), 1);
        assert_eq!(manifest.failed_record_ids.len(), 2);
    }

    #[test]
    fn test_manifest_preserves_record_identity() {
        let accepted = result(RecordOutcome::Accepted);
        let duplicate = result(RecordOutcome::DuplicateSkipped);
        let manifest = build_manifest(vec![accepted.clone(), duplicate.clone()], Utc::now());

        assert_eq!(manifest.processed_record_ids, vec![accepted.record_id]);
        assert_eq!(manifest.failed_record_ids, vec![duplicate.record_id]);
        assert_eq!(manifest.outcomes.len(), 2);
    }

    #[test]
    fn test_empty_batch_manifest() {
        let manifest = build_manifest(Vec::new(), Utc::now());
        assert_eq!(manifest.received, 0);
        assert_eq!(manifest.processed, 0);
        assert_eq!(manifest.failed, 0);
        assert!(manifest.outcomes.is_empty());
    }

    #[test]
    fn test_record_outcome_serializes_tagged() {
        let json = serde_json::to_value(RecordOutcome::DuplicateSkipped).unwrap();
        assert_eq!(json["outcome"], "duplicate_skipped");

        let json = serde_json::to_value(RecordOutcome::Rejected("bad".to_string())).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["detail"], "bad");
    }
}
