//! Push provider trait for token-addressed mobile notifications.

use async_trait::async_trait;

use crate::result::AppResult;

/// A notification payload addressed to a single device token.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Structured data payload delivered alongside the notification.
    pub data: serde_json::Value,
}

/// Outcome of a single token-addressed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The provider accepted the message.
    Delivered,
    /// The provider reported the token as no longer valid.
    ///
    /// Callers prune such tokens from storage.
    InvalidToken,
    /// Delivery failed for a transient or unknown reason.
    Failed(String),
}

/// Trait for mobile push backends.
///
/// The trait lives here in `gatesync-core` and is implemented in
/// `gatesync-realtime`. Delivery is best-effort: a [`PushOutcome::Failed`]
/// result is logged by callers and never propagated.
#[async_trait]
pub trait PushProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "http", "noop").
    fn provider_type(&self) -> &str;

    /// Send a message to a single device token.
    async fn send(&self, token: &str, message: &PushMessage) -> AppResult<PushOutcome>;
}

/// A provider that silently drops every message.
///
/// Used when push is disabled in configuration and in unit tests.
#[derive(Debug, Default)]
pub struct NoopPushProvider;

#[async_trait]
impl PushProvider for NoopPushProvider {
    fn provider_type(&self) -> &str {
        "noop"
    }

    async fn send(&self, _token: &str, _message: &PushMessage) -> AppResult<PushOutcome> {
        Ok(PushOutcome::Delivered)
    }
}
