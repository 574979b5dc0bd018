//! Realtime engine — connection lifecycle and room-scoped emission.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use gatesync_core::config::realtime::RealtimeConfig;
use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;

use crate::connection::{ConnectionHandle, ConnectionPool};
use crate::message::ServerEvent;
use crate::rooms::{guardian_room, RoomRegistry};

/// Manages all live guardian sockets and their room memberships.
#[derive(Debug)]
pub struct RealtimeEngine {
    /// Live connection pool.
    pool: ConnectionPool,
    /// Room membership registry.
    rooms: RoomRegistry,
    /// Configuration.
    config: RealtimeConfig,
}

impl RealtimeEngine {
    /// Creates a new engine.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            config,
        }
    }

    /// Registers an authenticated guardian socket.
    ///
    /// Returns the handle and the receiver feeding the socket writer task.
    /// A guardian over the connection cap has their oldest socket dropped.
    pub fn register(&self, guardian_id: Uuid) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(guardian_id, tx));

        let existing = self.pool.guardian_connections(guardian_id);
        if existing.len() >= self.config.max_connections_per_guardian {
            if let Some(oldest) = existing.first() {
                warn!(
                    guardian_id = %guardian_id,
                    conn_id = %oldest,
                    "Guardian at max connections, dropping oldest socket"
                );
                self.unregister(*oldest);
            }
        }

        self.pool.add(handle.clone());

        info!(
            conn_id = %handle.id,
            guardian_id = %guardian_id,
            "Guardian socket registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and clears its room memberships.
    pub fn unregister(&self, conn_id: Uuid) {
        self.rooms.leave_all(conn_id);
        if let Some(handle) = self.pool.remove(conn_id) {
            info!(
                conn_id = %conn_id,
                guardian_id = %handle.guardian_id,
                "Guardian socket closed"
            );
        }
    }

    /// Joins a connection to a room.
    ///
    /// Guardians may only join their own private room.
    pub fn join_room(&self, conn_id: Uuid, room: &str) -> AppResult<()> {
        let handle = self
            .pool
            .get(conn_id)
            .ok_or_else(|| AppError::authentication("Unknown connection"))?;

        if room != guardian_room(handle.guardian_id) {
            return Err(AppError::authentication(
                "Guardians may only join their own room",
            ));
        }

        self.rooms.join(room, conn_id);
        Ok(())
    }

    /// Emits an event into a room; unreachable members are skipped.
    pub fn emit_to_room(&self, room: &str, event: &ServerEvent) {
        let wire = event.to_wire();
        for conn_id in self.rooms.members(room) {
            if let Some(handle) = self.pool.get(conn_id) {
                if !handle.send(wire.clone()) {
                    warn!(conn_id = %conn_id, room = %room, "Dropped realtime message");
                }
            }
        }
    }

    /// Emits an event into a guardian's private room.
    pub fn emit_to_guardian(&self, guardian_id: Uuid, event: &ServerEvent) {
        self.emit_to_room(&guardian_room(guardian_id), event);
    }

    /// Whether a guardian has at least one live socket.
    pub fn is_online(&self, guardian_id: Uuid) -> bool {
        self.pool.is_online(guardian_id)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RealtimeEngine {
        RealtimeEngine::new(RealtimeConfig::default())
    }

    #[tokio::test]
    async fn test_emit_reaches_joined_guardian() {
        let engine = engine();
        let guardian = Uuid::new_v4();
        let (handle, mut rx) = engine.register(guardian);
        engine.join_room(handle.id, &guardian_room(guardian)).unwrap();

        engine.emit_to_guardian(
            guardian,
            &ServerEvent::Authenticated {
                guardian_id: guardian,
            },
        );

        let wire = rx.recv().await.unwrap();
        assert!(wire.contains("authenticated"));
    }

    #[tokio::test]
    async fn test_join_foreign_room_rejected() {
        let engine = engine();
        let guardian = Uuid::new_v4();
        let (handle, _rx) = engine.register(guardian);

        let err = engine
            .join_room(handle.id, &guardian_room(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(err.kind, gatesync_core::error::ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_unregister_clears_membership() {
        let engine = engine();
        let guardian = Uuid::new_v4();
        let (handle, _rx) = engine.register(guardian);
        engine.join_room(handle.id, &guardian_room(guardian)).unwrap();

        engine.unregister(handle.id);
        assert!(!engine.is_online(guardian));
        assert_eq!(engine.connection_count(), 0);
    }
}
