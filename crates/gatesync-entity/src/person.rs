//! Person entity models (students and guardians).
//!
//! Identity records are owned by the profile subsystem; this crate reads
//! them for roster sync, scan resolution, and fan-out target resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a person is a student or a guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "person_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    /// A student tracked through the gate.
    Student,
    /// A guardian linked to one or more students.
    Guardian,
}

impl std::fmt::Display for PersonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Guardian => write!(f, "guardian"),
        }
    }
}

impl std::str::FromStr for PersonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "guardian" => Ok(Self::Guardian),
            other => Err(format!("unknown person type '{other}'")),
        }
    }
}

/// A student or guardian identity record, company-scoped.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Person {
    /// Unique person identifier.
    pub id: Uuid,
    /// Owning company (tenant).
    pub company_id: Uuid,
    /// Whether this row is a student or guardian.
    pub person_type: PersonType,
    /// Display name.
    pub full_name: String,
    /// External code printed on the badge/QR.
    pub code: String,
    /// Whether the person is active.
    pub is_active: bool,
    /// Soft-delete timestamp (None = not deleted).
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time; drives the sync cursor.
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Whether the person may be resolved by a scan or synced to a device.
    pub fn is_resolvable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Many-to-many link between a student and a guardian.
///
/// Owned by the profile subsystem; read here to resolve fan-out targets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuardianLink {
    /// The student side of the link.
    pub student_id: Uuid,
    /// The guardian side of the link.
    pub guardian_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_type_round_trip() {
        assert_eq!("student".parse::<PersonType>(), Ok(PersonType::Student));
        assert_eq!("guardian".parse::<PersonType>(), Ok(PersonType::Guardian));
        assert!("teacher".parse::<PersonType>().is_err());
        assert_eq!(PersonType::Student.to_string(), "student");
    }

    #[test]
    fn test_resolvable_requires_active_and_not_deleted() {
        let mut person = Person {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            person_type: PersonType::Student,
            full_name: "Dana Kim".to_string(),
            code: "S-001".to_string(),
            is_active: true,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(person.is_resolvable());

        person.is_active = false;
        assert!(!person.is_resolvable());

        person.is_active = true;
        person.deleted_at = Some(Utc::now());
        assert!(!person.is_resolvable());
    }
}
