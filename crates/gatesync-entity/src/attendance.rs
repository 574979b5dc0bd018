//! Attendance ledger entity model and the per-day alternation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::person::PersonType;

/// Direction of an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attendance_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    /// The person entered the premises.
    CheckIn,
    /// The person left the premises.
    CheckOut,
}

impl AttendanceAction {
    /// The action a fresh scan should record, given the last action today.
    ///
    /// No event yet or last was a check-out means the person is outside,
    /// so the next scan is a check-in; otherwise it is a check-out. The
    /// state resets implicitly at each local-day boundary because only
    /// today's events are consulted.
    pub fn next_after(last_today: Option<AttendanceAction>) -> AttendanceAction {
        match last_today {
            None | Some(AttendanceAction::CheckOut) => AttendanceAction::CheckIn,
            Some(AttendanceAction::CheckIn) => AttendanceAction::CheckOut,
        }
    }
}

impl std::fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckIn => write!(f, "check_in"),
            Self::CheckOut => write!(f, "check_out"),
        }
    }
}

/// Derived presence status of a person at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// No event recorded today.
    NoAttendance,
    /// Last event today was a check-in.
    InSchool,
    /// Last event today was a check-out.
    OutOfSchool,
}

impl AttendanceStatus {
    /// Derive the status from the most recent action of the local day.
    pub fn from_last_action(last_today: Option<AttendanceAction>) -> Self {
        match last_today {
            None => Self::NoAttendance,
            Some(AttendanceAction::CheckIn) => Self::InSchool,
            Some(AttendanceAction::CheckOut) => Self::OutOfSchool,
        }
    }
}

/// How an attendance event entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// A trusted single check-in/check-out call.
    Direct,
    /// A QR smart scan resolved on the server.
    Scan,
    /// An offline device resyncing buffered events; subject to dedup.
    Batch,
}

/// One row of the append-only attendance ledger.
///
/// Rows are never mutated after creation, with the single exception of the
/// `pulled_at` marker set by the downstream read stream.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Person the event belongs to.
    pub person_id: Uuid,
    /// Whether the person is a student or guardian.
    pub person_type: PersonType,
    /// Check-in or check-out.
    pub action: AttendanceAction,
    /// When the event occurred (device clock for batched events).
    pub recorded_at: DateTime<Utc>,
    /// License of the device that produced the event.
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
    /// Entry path that produced this row.
    pub source: EventSource,
    /// When the downstream consumer pulled this event (None = pending).
    pub pulled_at: Option<DateTime<Utc>>,
    /// Coarse time bucket backing the duplicate-insert unique index.
    pub dedup_bucket: i64,
    /// Ledger insertion time; drives the downstream pull watermark.
    pub created_at: DateTime<Utc>,
}

/// Compute the coarse dedup bucket for a timestamp.
///
/// Two submissions of the same (person, action) falling into the same
/// bucket violate the partial unique index and are rejected at insert
/// time, closing the read-then-write race in the window check.
pub fn dedup_bucket(recorded_at: DateTime<Utc>, window_seconds: i64) -> i64 {
    recorded_at.timestamp().div_euclid(window_seconds.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_alternation_starts_with_check_in() {
        assert_eq!(AttendanceAction::next_after(None), AttendanceAction::CheckIn);
    }

    #[test]
    fn test_alternation_strictly_alternates() {
        let mut last = None;
        let mut seen = Vec::new();
        for _ in 0..6 {
            let next = AttendanceAction::next_after(last);
            seen.push(next);
            last = Some(next);
        }
        assert_eq!(
            seen,
            vec![
                AttendanceAction::CheckIn,
                AttendanceAction::CheckOut,
                AttendanceAction::CheckIn,
                AttendanceAction::CheckOut,
                AttendanceAction::CheckIn,
                AttendanceAction::CheckOut,
            ]
        );
    }

    #[test]
    fn test_status_from_last_action() {
        assert_eq!(
            AttendanceStatus::from_last_action(None),
            AttendanceStatus::NoAttendance
        );
        assert_eq!(
            AttendanceStatus::from_last_action(Some(AttendanceAction::CheckIn)),
            AttendanceStatus::InSchool
        );
        assert_eq!(
            AttendanceStatus::from_last_action(Some(AttendanceAction::CheckOut)),
            AttendanceStatus::OutOfSchool
        );
    }

    #[test]
    fn test_dedup_bucket_groups_within_window() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2024, 6, 1, 8, 3, 0).unwrap();
        let far = Utc.with_ymd_and_hms(2024, 6, 1, 8, 10, 0).unwrap();
        assert_eq!(dedup_bucket(base, 300), dedup_bucket(close, 300));
        assert_ne!(dedup_bucket(base, 300), dedup_bucket(far, 300));
    }
}
