use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banner_service::{Backends, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "banner_service=debug,banner_db=debug,banner_cache=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServiceConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        max_connections = config.max_connections,
        redis_url = %config.cache.url,
        invalidate_on_write = config.policy.invalidate_on_write,
        "Loaded service configuration"
    );

    // --- Backends ---
    let backends = Backends::connect(&config).await?;
    backends.health_check().await?;
    tracing::info!("Backend health checks passed");

    // --- Migrations ---
    banner_db::run_migrations(&backends.pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    tracing::info!("Banner store ready");
    Ok(())
}
