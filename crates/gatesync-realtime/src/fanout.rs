//! Attendance notification fan-out.
//!
//! Given a persisted student attendance event, delivers it to every linked
//! guardian over three independent failure domains: the realtime socket
//! room, best-effort mobile push, and the durable in-app inbox. A failure
//! in one channel never blocks another, and nothing here can fail the
//! originating attendance write — the caller only logs errors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, error, info};
use uuid::Uuid;

use gatesync_core::traits::push::{PushMessage, PushOutcome, PushProvider};
use gatesync_database::repositories::notification::NotificationRepository;
use gatesync_database::repositories::person::PersonRepository;
use gatesync_database::repositories::push_token::PushTokenRepository;
use gatesync_entity::attendance::{AttendanceAction, AttendanceEvent, AttendanceStatus};
use gatesync_entity::push_token::PushToken;

use crate::message::ServerEvent;
use crate::server::RealtimeEngine;

/// Title of every attendance inbox notification.
const NOTIFICATION_TITLE: &str = "Attendance Update";

/// Dispatches one attendance event to all guardians of the student.
#[derive(Debug)]
pub struct AttendanceFanout {
    /// Realtime engine for socket delivery.
    engine: Arc<RealtimeEngine>,
    /// Person directory, for guardian link resolution.
    persons: Arc<PersonRepository>,
    /// Durable inbox store.
    notifications: Arc<NotificationRepository>,
    /// Push token store.
    push_tokens: Arc<PushTokenRepository>,
    /// Push backend.
    push: Arc<dyn PushProvider>,
}

impl AttendanceFanout {
    /// Creates a new fan-out dispatcher.
    pub fn new(
        engine: Arc<RealtimeEngine>,
        persons: Arc<PersonRepository>,
        notifications: Arc<NotificationRepository>,
        push_tokens: Arc<PushTokenRepository>,
        push: Arc<dyn PushProvider>,
    ) -> Self {
        Self {
            engine,
            persons,
            notifications,
            push_tokens,
            push,
        }
    }

    /// Fan a persisted student event out to every linked guardian.
    ///
    /// Guardians are dispatched concurrently and unordered; there is no
    /// all-or-nothing guarantee.
    pub async fn dispatch(&self, event: &AttendanceEvent, student_name: &str) {
        let guardians = match self.persons.guardians_of_student(event.person_id).await {
            Ok(g) => g,
            Err(e) => {
                error!(
                    event_id = %event.id,
                    error = %e,
                    "Fan-out aborted: could not resolve guardians"
                );
                return;
            }
        };

        if guardians.is_empty() {
            debug!(event_id = %event.id, "No linked guardians, nothing to fan out");
            return;
        }

        info!(
            event_id = %event.id,
            student_id = %event.person_id,
            guardians = guardians.len(),
            "Fanning out attendance event"
        );

        join_all(
            guardians
                .iter()
                .map(|g| self.notify_guardian(g.id, event, student_name)),
        )
        .await;
    }

    /// Deliver one event to one guardian over all three channels.
    async fn notify_guardian(&self, guardian_id: Uuid, event: &AttendanceEvent, student_name: &str) {
        let body = notification_body(student_name, event.action, event.recorded_at);

        // Durable inbox: the system of record, written regardless of the
        // other channels.
        if let Err(e) = self
            .notifications
            .create(guardian_id, NOTIFICATION_TITLE, &body, Some(event.id))
            .await
        {
            error!(guardian_id = %guardian_id, error = %e, "Inbox write failed");
        }

        // Realtime: derived status plus the raw log entry into the
        // guardian's private room.
        self.engine.emit_to_guardian(
            guardian_id,
            &ServerEvent::StatusUpdate {
                student_id: event.person_id,
                student_name: student_name.to_string(),
                status: AttendanceStatus::from_last_action(Some(event.action)),
                recorded_at: event.recorded_at,
            },
        );
        self.engine.emit_to_guardian(
            guardian_id,
            &ServerEvent::NewLog {
                event_id: event.id,
                student_id: event.person_id,
                action: event.action,
                recorded_at: event.recorded_at,
                gate_id: event.gate_id,
            },
        );

        // Push: best-effort nudge; prune tokens the provider rejects.
        let tokens = match self.push_tokens.find_by_guardian(guardian_id).await {
            Ok(t) => t,
            Err(e) => {
                error!(guardian_id = %guardian_id, error = %e, "Token lookup failed");
                return;
            }
        };

        let message = PushMessage {
            title: NOTIFICATION_TITLE.to_string(),
            body,
            data: serde_json::json!({
                "event_id": event.id,
                "student_id": event.person_id,
                "action": event.action,
            }),
        };

        let invalid = send_pushes(self.push.as_ref(), &tokens, &message).await;
        if !invalid.is_empty() {
            info!(
                guardian_id = %guardian_id,
                pruned = invalid.len(),
                "Pruning invalid push tokens"
            );
            if let Err(e) = self.push_tokens.prune(&invalid).await {
                error!(guardian_id = %guardian_id, error = %e, "Token prune failed");
            }
        }
    }
}

/// Send a message to every token and collect the provider-invalidated ones.
async fn send_pushes(
    provider: &dyn PushProvider,
    tokens: &[PushToken],
    message: &PushMessage,
) -> Vec<String> {
    let mut invalid = Vec::new();
    for token in tokens {
        match provider.send(&token.token, message).await {
            Ok(PushOutcome::Delivered) => {}
            Ok(PushOutcome::InvalidToken) => invalid.push(token.token.clone()),
            Ok(PushOutcome::Failed(reason)) => {
                debug!(token = %token.token, reason = %reason, "Push send failed");
            }
            Err(e) => {
                debug!(token = %token.token, error = %e, "Push provider error");
            }
        }
    }
    invalid
}

/// Human-readable inbox/push body for an attendance event.
fn notification_body(
    student_name: &str,
    action: AttendanceAction,
    recorded_at: DateTime<Utc>,
) -> String {
    let verb = match action {
        AttendanceAction::CheckIn => "checked in",
        AttendanceAction::CheckOut => "checked out",
    };
    format!(
        "{student_name} {verb} at {}",
        recorded_at.format("%H:%M on %Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use gatesync_core::result::AppResult;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        /// Tokens to report as invalid.
        dead_tokens: Vec<String>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PushProvider for ScriptedProvider {
        fn provider_type(&self) -> &str {
            "scripted"
        }

        async fn send(&self, token: &str, _message: &PushMessage) -> AppResult<PushOutcome> {
            self.sent.lock().unwrap().push(token.to_string());
            if self.dead_tokens.iter().any(|t| t == token) {
                Ok(PushOutcome::InvalidToken)
            } else {
                Ok(PushOutcome::Delivered)
            }
        }
    }

    fn token(value: &str) -> PushToken {
        PushToken {
            id: Uuid::new_v4(),
            guardian_id: Uuid::new_v4(),
            token: value.to_string(),
            platform: None,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn test_send_pushes_collects_only_invalid_tokens() {
        let provider = ScriptedProvider {
            dead_tokens: vec!["dead".to_string()],
            ..Default::default()
        };
        let tokens = vec![token("live"), token("dead"), token("live2")];
        let message = PushMessage {
            title: "t".to_string(),
            body: "b".to_string(),
            data: serde_json::json!({}),
        };

        let invalid = send_pushes(&provider, &tokens, &message).await;
        assert_eq!(invalid, vec!["dead".to_string()]);
        // Every token was attempted regardless of other outcomes.
        assert_eq!(provider.sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_notification_body_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(
            notification_body("Dana Kim", AttendanceAction::CheckIn, at),
            "Dana Kim checked in at 08:00 on 2024-06-01"
        );
    }
}
