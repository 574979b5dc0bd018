//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use sqlx::PgPool;

use gatesync_core::config::AppConfig;
use gatesync_database::repositories::attendance::AttendanceRepository;
use gatesync_database::repositories::connection::ConnectionRepository;
use gatesync_database::repositories::gate::GateRepository;
use gatesync_database::repositories::license::LicenseRepository;
use gatesync_database::repositories::notification::NotificationRepository;
use gatesync_database::repositories::person::PersonRepository;
use gatesync_database::repositories::push_token::PushTokenRepository;
use gatesync_database::repositories::sync_audit::SyncAuditRepository;
use gatesync_realtime::fanout::AttendanceFanout;
use gatesync_realtime::server::RealtimeEngine;
use gatesync_service::attendance::AttendanceService;
use gatesync_service::license::LicenseService;
use gatesync_service::pairing::PairingService;
use gatesync_service::sync::SyncService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Guardian notification fan-out dispatcher
    pub fanout: Arc<AttendanceFanout>,

    // ── Repositories ─────────────────────────────────────────
    /// License repository
    pub license_repo: Arc<LicenseRepository>,
    /// Device connection repository
    pub connection_repo: Arc<ConnectionRepository>,
    /// Gate repository
    pub gate_repo: Arc<GateRepository>,
    /// Person (roster) repository
    pub person_repo: Arc<PersonRepository>,
    /// Attendance ledger repository
    pub attendance_repo: Arc<AttendanceRepository>,
    /// Sync audit repository
    pub sync_audit_repo: Arc<SyncAuditRepository>,
    /// Guardian inbox repository
    pub notification_repo: Arc<NotificationRepository>,
    /// Push token repository
    pub push_token_repo: Arc<PushTokenRepository>,

    // ── Services ─────────────────────────────────────────────
    /// License lifecycle service
    pub license_service: Arc<LicenseService>,
    /// Device pairing service
    pub pairing_service: Arc<PairingService>,
    /// Roster sync service
    pub sync_service: Arc<SyncService>,
    /// Attendance ingestion service
    pub attendance_service: Arc<AttendanceService>,
}
