//! # Timetable API Main Entry Point
//!
//! Loads configuration, initializes tracing and the database pool, then
//! serves the API until shutdown.

use std::sync::Arc;

use anyhow::Context;
use timetable::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    telemetry::init_tracing(&config).context("failed to initialize tracing")?;

    match config.redacted_json() {
        Ok(redacted) => tracing::info!(profile = %config.profile, config = %redacted, "Configuration loaded"),
        Err(err) => tracing::warn!(error = %err, "Could not render configuration"),
    }

    let pool = db::init_pool(&config).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    run_server(Arc::new(config), pool).await
}
