//! Attendance ingestion pipeline and smart scan resolution.

pub mod scan;
pub mod service;

pub use scan::ScanPayload;
pub use service::{
    AttendanceFeed, AttendanceService, BatchManifest, BatchRecord, DailyStats, EventDetail,
    PendingStats, RecordOutcome, RecordResult,
};
