//! Application builder — wires repositories, services, and the realtime
//! engine into an Axum app and runs it.

use std::sync::Arc;

use sqlx::PgPool;

use gatesync_core::config::AppConfig;
use gatesync_core::error::AppError;
use gatesync_core::traits::push::{NoopPushProvider, PushProvider};
use gatesync_database::repositories::{
    attendance, connection, gate, license, notification, person, push_token, sync_audit,
};
use gatesync_realtime::fanout::AttendanceFanout;
use gatesync_realtime::push::HttpPushProvider;
use gatesync_realtime::server::RealtimeEngine;
use gatesync_service::attendance::AttendanceService;
use gatesync_service::license::LicenseService;
use gatesync_service::pairing::PairingService;
use gatesync_service::sync::SyncService;

use crate::router::build_router;
use crate::state::AppState;

/// Construct the full application state from configuration and a pool.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> Result<AppState, AppError> {
    // ── Repositories ─────────────────────────────────────────────
    let license_repo = Arc::new(license::LicenseRepository::new(db_pool.clone()));
    let connection_repo = Arc::new(connection::ConnectionRepository::new(db_pool.clone()));
    let gate_repo = Arc::new(gate::GateRepository::new(db_pool.clone()));
    let person_repo = Arc::new(person::PersonRepository::new(db_pool.clone()));
    let attendance_repo = Arc::new(attendance::AttendanceRepository::new(db_pool.clone()));
    let sync_audit_repo = Arc::new(sync_audit::SyncAuditRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(notification::NotificationRepository::new(db_pool.clone()));
    let push_token_repo = Arc::new(push_token::PushTokenRepository::new(db_pool.clone()));

    // ── Realtime & fan-out ───────────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));

    let push: Arc<dyn PushProvider> = if config.push.enabled {
        Arc::new(HttpPushProvider::from_config(&config.push)?)
    } else {
        tracing::info!("Push delivery disabled, using no-op provider");
        Arc::new(NoopPushProvider)
    };

    let fanout = Arc::new(AttendanceFanout::new(
        Arc::clone(&realtime),
        Arc::clone(&person_repo),
        Arc::clone(&notification_repo),
        Arc::clone(&push_token_repo),
        push,
    ));

    // ── Services ─────────────────────────────────────────────────
    let license_service = Arc::new(LicenseService::new(
        Arc::clone(&license_repo),
        Arc::clone(&gate_repo),
        config.device.clone(),
    ));
    let pairing_service = Arc::new(PairingService::new(
        Arc::clone(&license_repo),
        Arc::clone(&connection_repo),
        Arc::clone(&person_repo),
        Arc::clone(&gate_repo),
        config.device.clone(),
    ));
    let sync_service = Arc::new(SyncService::new(
        Arc::clone(&person_repo),
        Arc::clone(&connection_repo),
        Arc::clone(&sync_audit_repo),
        config.sync.clone(),
    ));
    let attendance_service = Arc::new(AttendanceService::new(
        Arc::clone(&attendance_repo),
        Arc::clone(&person_repo),
        Arc::clone(&sync_audit_repo),
        Arc::clone(&fanout),
        config.attendance.clone(),
    ));

    Ok(AppState {
        config: Arc::new(config),
        db_pool,
        realtime,
        fanout,
        license_repo,
        connection_repo,
        gate_repo,
        person_repo,
        attendance_repo,
        sync_audit_repo,
        notification_repo,
        push_token_repo,
        license_service,
        pairing_service,
        sync_service,
        attendance_service,
    })
}

/// Runs the GateSync server with the given configuration and pool.
///
/// On a shutdown signal, in-flight requests get the configured grace
/// period to drain before the process gives up waiting on them.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = shutdown_grace(&config.server);

    let state = build_state(config, db_pool)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("GateSync server listening on {addr}");

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let trigger = Arc::clone(&shutdown);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { trigger.notified().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
                Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
            };
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            shutdown.notify_one();
        }
    }

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(AppError::internal(format!("Server error: {e}"))),
        Ok(Err(e)) => Err(AppError::internal(format!("Server task failed: {e}"))),
        Err(_) => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Shutdown grace period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}

/// How long in-flight requests may drain after a shutdown signal.
fn shutdown_grace(server: &gatesync_core::config::app::ServerConfig) -> std::time::Duration {
    std::time::Duration::from_secs(server.shutdown_grace_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesync_core::config::app::ServerConfig;

    #[test]
    fn test_shutdown_grace_comes_from_config() {
        let server = ServerConfig {
            shutdown_grace_seconds: 7,
            ..ServerConfig::default()
        };
        assert_eq!(shutdown_grace(&server), std::time::Duration::from_secs(7));
    }
}
