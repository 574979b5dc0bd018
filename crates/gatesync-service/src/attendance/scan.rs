//! QR scan payload parsing and day-boundary helpers.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;
use gatesync_entity::person::PersonType;

/// Decoded `"<type>:<id>"` scan payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPayload {
    /// Person type encoded in the QR code.
    pub person_type: PersonType,
    /// Person id encoded in the QR code.
    pub person_id: Uuid,
}

impl ScanPayload {
    /// Parse a raw scan string, e.g. `student:9b1deb4d-...`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (kind, id) = raw
            .trim()
            .split_once(':')
            .ok_or_else(|| AppError::validation("Scan payload must be '<type>:<id>'"))?;

        let person_type = kind
            .parse::<PersonType>()
            .map_err(|_| AppError::validation(format!("Unknown person type '{kind}'")))?;
        let person_id = Uuid::parse_str(id)
            .map_err(|_| AppError::validation("Scan payload id is not a valid UUID"))?;

        Ok(Self {
            person_type,
            person_id,
        })
    }
}

/// Half-open `[start, end)` bounds of the calendar day containing `at`.
///
/// Day boundaries are taken in UTC; the alternation state resets when the
/// clock crosses them.
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_student_payload() {
        let id = Uuid::new_v4();
        let payload = ScanPayload::parse(&format!("student:{id}")).unwrap();
        assert_eq!(payload.person_type, PersonType::Student);
        assert_eq!(payload.person_id, id);
    }

    #[test]
    fn test_parse_guardian_payload_with_whitespace() {
        let id = Uuid::new_v4();
        let payload = ScanPayload::parse(&format!("  guardian:{id}\n")).unwrap();
        assert_eq!(payload.person_type, PersonType::Guardian);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = ScanPayload::parse("student").unwrap_err();
        assert_eq!(err.kind, gatesync_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let id = Uuid::new_v4();
        let err = ScanPayload::parse(&format!("teacher:{id}")).unwrap_err();
        assert_eq!(err.kind, gatesync_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_parse_rejects_bad_uuid() {
        let err = ScanPayload::parse("student:not-a-uuid").unwrap_err();
        assert_eq!(err.kind, gatesync_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_day_bounds_cover_the_whole_day() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 14, 30, 0).unwrap();
        let (start, end) = day_bounds(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());
        assert!(at >= start && at < end);
    }

    #[test]
    fn test_day_bounds_at_midnight() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let (start, _) = day_bounds(at);
        assert_eq!(start, at);
    }
}
