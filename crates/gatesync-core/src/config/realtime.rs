//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Settings for the guardian-facing realtime gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer size per connection.
    #[serde(default = "default_buffer_size")]
    pub channel_buffer_size: usize,
    /// Maximum concurrent sockets per guardian; the oldest is replaced.
    #[serde(default = "default_max_per_guardian")]
    pub max_connections_per_guardian: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_buffer_size(),
            max_connections_per_guardian: default_max_per_guardian(),
        }
    }
}

fn default_buffer_size() -> usize {
    64
}

fn default_max_per_guardian() -> usize {
    3
}
