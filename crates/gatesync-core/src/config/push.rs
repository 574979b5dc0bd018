//! Mobile push provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the token-addressed push provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Whether push delivery is enabled at all. Off unless an endpoint and
    /// credential are configured.
    #[serde(default)]
    pub enabled: bool,
    /// Provider HTTP endpoint for token-addressed sends.
    #[serde(default)]
    pub endpoint: String,
    /// API key sent as a bearer credential to the provider.
    #[serde(default)]
    pub api_key: String,
    /// Per-send timeout in seconds.
    #[serde(default = "default_timeout")]
    pub send_timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: String::new(),
            send_timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
