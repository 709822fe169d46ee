//! Tessera Server — application entry point.

use tessera_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tessera=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Tessera server...");

    let db_config = DbConfig {
        url: env_or("TESSERA_DB_URL", "127.0.0.1:8000"),
        namespace: env_or("TESSERA_DB_NAMESPACE", "tessera"),
        database: env_or("TESSERA_DB_DATABASE", "main"),
        username: env_or("TESSERA_DB_USER", "root"),
        password: env_or("TESSERA_DB_PASSWORD", "root"),
    };

    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = tessera_db::run_migrations(manager.db()).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    // TODO: REST API — usage inspection, migration, and checkout
    // reconciliation endpoints over the service layer.

    tracing::info!("Tessera server stopped.");
}
