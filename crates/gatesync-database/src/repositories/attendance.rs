//! Attendance ledger repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatesync_core::error::{AppError, ErrorKind};
use gatesync_core::result::AppResult;
use gatesync_entity::attendance::{dedup_bucket, AttendanceAction, AttendanceEvent, EventSource};
use gatesync_entity::person::PersonType;

/// Field set for a new ledger row.
#[derive(Debug, Clone)]
pub struct NewAttendanceEvent {
    /// Person the event belongs to.
    pub person_id: Uuid,
    /// Whether the person is a student or guardian.
    pub person_type: PersonType,
    /// Check-in or check-out.
    pub action: AttendanceAction,
    /// When the event occurred (device clock for batched events).
    pub recorded_at: DateTime<Utc>,
    /// License of the originating device.
    pub license_id: Option<Uuid>,
    /// Gate where the event occurred.
    pub gate_id: Option<Uuid>,
    /// Owning company (tenant).
    pub company_id: Uuid,
    /// Optional free-form location.
    pub location: Option<String>,
    /// Optional photo captured at the gate.
    pub photo_url: Option<String>,
    /// Optional body temperature reading.
    pub temperature: Option<f64>,
    /// Entry path producing the row.
    pub source: EventSource,
}

/// Repository for the append-only attendance ledger.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Create a new attendance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a ledger row.
    ///
    /// Batch-sourced rows participate in the duplicate unique index; an
    /// insert that collides returns `None` instead of a row, which callers
    /// surface as a duplicate outcome rather than an error.
    pub async fn insert(
        &self,
        event: &NewAttendanceEvent,
        dedup_window_seconds: i64,
    ) -> AppResult<Option<AttendanceEvent>> {
        let bucket = dedup_bucket(event.recorded_at, dedup_window_seconds);
        sqlx::query_as::<_, AttendanceEvent>(
            "INSERT INTO attendance_events \
                 (person_id, person_type, action, recorded_at, license_id, gate_id, \
                  company_id, location, photo_url, temperature, source, dedup_bucket) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (person_id, action, dedup_bucket) WHERE source = 'batch' \
                 DO NOTHING \
             RETURNING *",
        )
        .bind(event.person_id)
        .bind(event.person_type)
        .bind(event.action)
        .bind(event.recorded_at)
        .bind(event.license_id)
        .bind(event.gate_id)
        .bind(event.company_id)
        .bind(event.location.as_deref())
        .bind(event.photo_url.as_deref())
        .bind(event.temperature)
        .bind(event.source)
        .bind(bucket)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert event", e))
    }

    /// Whether a row for the same (person, action) exists within the
    /// preceding `window_seconds` of `recorded_at`.
    pub async fn exists_recent_duplicate(
        &self,
        person_id: Uuid,
        action: AttendanceAction,
        recorded_at: DateTime<Utc>,
        window_seconds: i64,
    ) -> AppResult<bool> {
        let window_start = recorded_at - chrono::Duration::seconds(window_seconds);
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance_events \
             WHERE person_id = $1 AND action = $2 \
               AND recorded_at > $3 AND recorded_at <= $4",
        )
        .bind(person_id)
        .bind(action)
        .bind(window_start)
        .bind(recorded_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check duplicates", e))?;
        Ok(count > 0)
    }

    /// The most recent action for a person within the given day bounds.
    pub async fn last_action_between(
        &self,
        person_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceAction>> {
        sqlx::query_scalar::<_, AttendanceAction>(
            "SELECT action FROM attendance_events \
             WHERE person_id = $1 AND recorded_at >= $2 AND recorded_at < $3 \
             ORDER BY recorded_at DESC LIMIT 1",
        )
        .bind(person_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch last action", e))
    }

    /// Downstream read stream page: events created after the watermark,
    /// ascending by creation time.
    pub async fn pull_after(
        &self,
        company_id: Uuid,
        cursor: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<AttendanceEvent>> {
        sqlx::query_as::<_, AttendanceEvent>(
            "SELECT * FROM attendance_events \
             WHERE company_id = $1 AND created_at > $2 \
             ORDER BY created_at ASC LIMIT $3",
        )
        .bind(company_id)
        .bind(cursor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to pull events", e))
    }

    /// Mark a set of events as pulled (first pull wins; the marker is
    /// never overwritten).
    pub async fn mark_pulled(&self, ids: &[Uuid], now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE attendance_events \
             SET pulled_at = COALESCE(pulled_at, $2) WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark pulled", e))?;
        Ok(result.rows_affected())
    }

    /// Count of never-pulled events plus the oldest pending creation time.
    pub async fn pending_stats(
        &self,
        company_id: Uuid,
    ) -> AppResult<(i64, Option<DateTime<Utc>>)> {
        let row: (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            "SELECT COUNT(*), MIN(created_at) FROM attendance_events \
             WHERE company_id = $1 AND pulled_at IS NULL",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count pending", e))?;
        Ok(row)
    }

    /// All events recorded within the day bounds for a company.
    pub async fn events_between(
        &self,
        company_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Vec<AttendanceEvent>> {
        sqlx::query_as::<_, AttendanceEvent>(
            "SELECT * FROM attendance_events \
             WHERE company_id = $1 AND recorded_at >= $2 AND recorded_at < $3 \
             ORDER BY recorded_at ASC",
        )
        .bind(company_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list day events", e))
    }

    /// Students whose latest event in the day bounds is a check-in.
    pub async fn currently_checked_in(
        &self,
        company_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT person_id FROM ( \
                 SELECT DISTINCT ON (person_id) person_id, action \
                 FROM attendance_events \
                 WHERE company_id = $1 AND person_type = 'student' \
                   AND recorded_at >= $2 AND recorded_at < $3 \
                 ORDER BY person_id, recorded_at DESC \
             ) latest WHERE action = 'check_in'",
        )
        .bind(company_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list checked-in students", e)
        })
    }

    /// Daily aggregate: (check-ins, check-outs, distinct persons).
    pub async fn daily_stats(
        &self,
        company_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<(i64, i64, i64)> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE action = 'check_in'), \
                 COUNT(*) FILTER (WHERE action = 'check_out'), \
                 COUNT(DISTINCT person_id) \
             FROM attendance_events \
             WHERE company_id = $1 AND recorded_at >= $2 AND recorded_at < $3",
        )
        .bind(company_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute stats", e))?;
        Ok(row)
    }
}
