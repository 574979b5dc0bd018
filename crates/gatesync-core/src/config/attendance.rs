//! Attendance ingestion configuration.

use serde::{Deserialize, Serialize};

/// Settings for the attendance ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Lookback window in seconds for treating a batch record as a duplicate.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_seconds: i64,
    /// Maximum records accepted in a single batch push.
    #[serde(default = "default_batch_max")]
    pub max_batch_records: usize,
    /// Hard cap on records returned per downstream attendance pull.
    #[serde(default = "default_pull_limit")]
    pub max_pull_limit: i64,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            dedup_window_seconds: default_dedup_window(),
            max_batch_records: default_batch_max(),
            max_pull_limit: default_pull_limit(),
        }
    }
}

fn default_dedup_window() -> i64 {
    300
}

fn default_batch_max() -> usize {
    1000
}

fn default_pull_limit() -> i64 {
    1000
}
