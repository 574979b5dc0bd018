//! Wire messages exchanged over the guardian socket namespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatesync_entity::attendance::{AttendanceAction, AttendanceStatus};

/// Events sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Authenticate the socket session with a registered device token.
    Authenticate {
        /// Guardian claiming the session.
        guardian_id: Uuid,
        /// A device token registered for that guardian.
        token: String,
    },
    /// Join a room; guardians may only join their own private room.
    JoinRoom {
        /// Room name, e.g. `guardian:{id}`.
        room: String,
    },
}

/// Events emitted by the server into guardian rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Derived presence change for a linked student.
    StatusUpdate {
        /// The student whose status changed.
        student_id: Uuid,
        /// Display name of the student.
        student_name: String,
        /// Derived status after the event.
        status: AttendanceStatus,
        /// When the event occurred.
        recorded_at: DateTime<Utc>,
    },
    /// The raw attendance log entry.
    NewLog {
        /// Ledger row identifier.
        event_id: Uuid,
        /// The student the entry belongs to.
        student_id: Uuid,
        /// Check-in or check-out.
        action: AttendanceAction,
        /// When the event occurred.
        recorded_at: DateTime<Utc>,
        /// Gate where the event occurred.
        gate_id: Option<Uuid>,
    },
    /// Authentication acknowledgement.
    Authenticated {
        /// The authenticated guardian.
        guardian_id: Uuid,
    },
    /// An error the client can act on (bad payload, unauthorized room).
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerEvent {
    /// Serialize for the socket; infallible for these shapes.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"event\":\"error\"}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_parses_snake_case() {
        let raw = r#"{"event":"join_room","data":{"room":"guardian:123"}}"#;
        let parsed: ClientEvent = serde_json::from_str(raw).unwrap();
        match parsed {
            ClientEvent::JoinRoom { room } => assert_eq!(room, "guardian:123"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_server_event_wire_shape() {
        let wire = ServerEvent::Error {
            message: "nope".to_string(),
        }
        .to_wire();
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["data"]["message"], "nope");
    }
}
