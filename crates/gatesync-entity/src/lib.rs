//! # gatesync-entity
//!
//! Entity models mapped to PostgreSQL rows via sqlx `FromRow`, plus the
//! domain enums (person type, attendance action, sync status) shared by
//! every other crate.

pub mod attendance;
pub mod connection;
pub mod gate;
pub mod license;
pub mod notification;
pub mod person;
pub mod push_token;
pub mod sync_audit;

pub use attendance::{AttendanceAction, AttendanceEvent, AttendanceStatus, EventSource};
pub use connection::DeviceConnection;
pub use gate::Gate;
pub use license::DeviceLicense;
pub use notification::GuardianNotification;
pub use person::{GuardianLink, Person, PersonType};
pub use push_token::PushToken;
pub use sync_audit::{SyncAudit, SyncStatus};
