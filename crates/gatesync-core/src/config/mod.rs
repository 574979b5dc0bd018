//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod attendance;
pub mod device;
pub mod logging;
pub mod push;
pub mod realtime;
pub mod sync;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::attendance::AttendanceConfig;
use self::device::DeviceConfig;
use self::logging::LoggingConfig;
use self::push::PushConfig;
use self::realtime::RealtimeConfig;
use self::sync::SyncConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Device licensing and pairing settings.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Roster pull-sync settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Attendance ingestion settings.
    #[serde(default)]
    pub attendance: AttendanceConfig,
    /// Mobile push provider settings.
    #[serde(default)]
    pub push: PushConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `GATESYNC`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GATESYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        let device = DeviceConfig::default();
        assert_eq!(device.license_key_length, 24);
        assert_eq!(device.max_generate_attempts, 5);
        assert_eq!(device.heartbeat_stale_seconds, 300);

        let sync = SyncConfig::default();
        assert_eq!(sync.max_pull_limit, 5000);
        assert_eq!(sync.default_pull_limit, 500);

        let attendance = AttendanceConfig::default();
        assert_eq!(attendance.dedup_window_seconds, 300);
        assert_eq!(attendance.max_batch_records, 1000);
    }

    #[test]
    fn test_minimal_toml_deserializes_with_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/gatesync"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.sync.max_pull_limit, 5000);
        assert!(!config.push.enabled);
    }
}
