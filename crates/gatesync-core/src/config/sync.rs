//! Roster pull-sync configuration.

use serde::{Deserialize, Serialize};

/// Settings for the incremental roster sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hard cap on records returned per entity type per pull.
    #[serde(default = "default_max_pull_limit")]
    pub max_pull_limit: i64,
    /// Limit applied when the device does not supply one.
    #[serde(default = "default_pull_limit")]
    pub default_pull_limit: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_pull_limit: default_max_pull_limit(),
            default_pull_limit: default_pull_limit(),
        }
    }
}

fn default_max_pull_limit() -> i64 {
    5000
}

fn default_pull_limit() -> i64 {
    500
}
