//! Room registry — in-process membership of private guardian rooms.
//!
//! Derived, rebuildable state: membership exists only while the backing
//! sockets are alive and is reconstructed on every connect/disconnect.
//! Multi-instance deployments need a shared broadcast layer on top.

use std::collections::HashSet;

use dashmap::DashMap;
use uuid::Uuid;

/// Compute the private room name for a guardian.
pub fn guardian_room(guardian_id: Uuid) -> String {
    format!("guardian:{guardian_id}")
}

/// Registry of room memberships, indexed both ways.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connection ids.
    rooms: DashMap<String, HashSet<Uuid>>,
    /// Connection id → joined room names (reverse index for cleanup).
    memberships: DashMap<Uuid, HashSet<String>>,
}

impl RoomRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room.
    pub fn join(&self, room: &str, conn_id: Uuid) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships
            .entry(conn_id)
            .or_default()
            .insert(room.to_string());
    }

    /// Removes a connection from all rooms it joined.
    pub fn leave_all(&self, conn_id: Uuid) {
        let Some((_, rooms)) = self.memberships.remove(&conn_id) else {
            return;
        };
        for room in rooms {
            if let Some(mut members) = self.rooms.get_mut(&room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.rooms.remove(&room);
                }
            }
        }
    }

    /// Returns the member connection ids of a room.
    pub fn members(&self, room: &str) -> Vec<Uuid> {
        self.rooms
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardian_room_name() {
        let id = Uuid::nil();
        assert_eq!(
            guardian_room(id),
            "guardian:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_join_and_leave_all() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        registry.join("guardian:a", conn);
        registry.join("guardian:b", conn);
        assert_eq!(registry.members("guardian:a"), vec![conn]);
        assert_eq!(registry.room_count(), 2);

        registry.leave_all(conn);
        assert!(registry.members("guardian:a").is_empty());
        // Empty rooms are dropped entirely.
        assert_eq!(registry.room_count(), 0);
    }
}
