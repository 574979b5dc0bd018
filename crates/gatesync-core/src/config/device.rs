//! Device licensing and pairing configuration.

use serde::{Deserialize, Serialize};

/// Settings governing license key issuance and device pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Length of generated license keys (alphanumeric characters).
    #[serde(default = "default_key_length")]
    pub license_key_length: usize,
    /// Maximum attempts when a generated key collides with an existing one.
    #[serde(default = "default_max_attempts")]
    pub max_generate_attempts: u32,
    /// Maximum number of licenses issuable in a single generate call.
    #[serde(default = "default_batch_max")]
    pub max_batch_size: u32,
    /// Seconds after which a silent connection is considered stale.
    #[serde(default = "default_stale_seconds")]
    pub heartbeat_stale_seconds: i64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            license_key_length: default_key_length(),
            max_generate_attempts: default_max_attempts(),
            max_batch_size: default_batch_max(),
            heartbeat_stale_seconds: default_stale_seconds(),
        }
    }
}

fn default_key_length() -> usize {
    24
}

fn default_max_attempts() -> u32 {
    5
}

fn default_batch_max() -> u32 {
    100
}

fn default_stale_seconds() -> i64 {
    300
}
