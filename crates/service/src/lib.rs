//! Service wiring for the banner store.
//!
//! [`connect`] is the single construction point for a ready [`BannerEngine`]:
//! it opens the PostgreSQL pool and the Redis connection described by a
//! [`ServiceConfig`] and hands both to the engine.

use std::sync::Arc;

use anyhow::Context;
use banner_cache::RedisCache;
use banner_core::{BannerEngine, CachePolicy};
use banner_db::{DbPool, PgContentStore};

pub mod config;

pub use config::{ConfigError, ServiceConfig};

/// Open connections to both backends.
#[derive(Clone)]
pub struct Backends {
    pub pool: DbPool,
    pub cache: RedisCache,
}

impl Backends {
    pub async fn connect(config: &ServiceConfig) -> anyhow::Result<Self> {
        let pool = banner_db::create_pool(&config.database_url, config.max_connections)
            .await
            .context("Failed to connect to database")?;
        tracing::info!(
            max_connections = config.max_connections,
            "Database connection pool created"
        );

        let cache = RedisCache::connect(&config.cache)
            .await
            .context("Failed to connect to Redis")?;
        tracing::info!("Redis connection created");

        Ok(Self { pool, cache })
    }

    /// Verify both backends answer.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        banner_db::health_check(&self.pool)
            .await
            .context("Database health check failed")?;
        self.cache.ping().await.context("Redis health check failed")?;
        Ok(())
    }

    pub fn engine(&self, policy: CachePolicy) -> BannerEngine {
        BannerEngine::new(
            Arc::new(PgContentStore::new(self.pool.clone())),
            Arc::new(self.cache.clone()),
        )
        .with_policy(policy)
    }
}

/// Build a [`BannerEngine`] over PostgreSQL and Redis.
pub async fn connect(config: &ServiceConfig) -> anyhow::Result<BannerEngine> {
    let backends = Backends::connect(config).await?;
    Ok(backends.engine(config.policy))
}
