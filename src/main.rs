//! GateSync server binary.

use tracing_subscriber::EnvFilter;

use gatesync_core::config::AppConfig;
use gatesync_database::{migration, DatabasePool};

#[tokio::main]
async fn main() {
    let env = std::env::var("GATESYNC_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!(env = %env, "Starting GateSync");

    let db = match DatabasePool::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = migration::run_migrations(db.pool()).await {
        tracing::error!(error = %e, "Migration failed");
        std::process::exit(1);
    }

    if let Err(e) = gatesync_api::run_server(config, db.into_pool()).await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
