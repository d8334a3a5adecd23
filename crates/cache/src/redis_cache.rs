use async_trait::async_trait;
use banner_core::banner::BannerContent;
use banner_core::cache::FastPathCache;
use banner_core::error::{CoreError, CoreResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::CacheConfig;

/// `FastPathCache` over Redis.
///
/// Cloning shares the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    ttl_secs: Option<u64>,
    prefix: String,
}

impl RedisCache {
    /// Open a managed connection to the server named in `config`.
    pub async fn connect(config: &CacheConfig) -> redis::RedisResult<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_connection_manager().await?;
        tracing::debug!(
            prefix = %config.key_prefix,
            ttl_secs = ?config.ttl_secs,
            "Redis connection established"
        );
        Ok(Self {
            conn,
            ttl_secs: config.ttl_secs,
            prefix: config.key_prefix.clone(),
        })
    }

    /// Round-trip a `PING` to verify the server is reachable.
    pub async fn ping(&self) -> redis::RedisResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// The Redis key under which the entry for `hash` is stored.
    pub fn key(&self, hash: u64) -> String {
        entry_key(&self.prefix, hash)
    }
}

fn entry_key(prefix: &str, hash: u64) -> String {
    format!("{prefix}:{hash:016x}")
}

fn decode(raw: &str) -> CoreResult<BannerContent> {
    serde_json::from_str(raw).map_err(|e| CoreError::Cache(format!("corrupt cache entry: {e}")))
}

fn cache_err(err: redis::RedisError) -> CoreError {
    CoreError::Cache(err.to_string())
}

#[async_trait]
impl FastPathCache for RedisCache {
    async fn get(&self, key: u64) -> CoreResult<Option<BannerContent>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(key)).await.map_err(cache_err)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn put(&self, key: u64, content: &BannerContent) -> CoreResult<()> {
        let value = serde_json::to_string(content)
            .map_err(|e| CoreError::Cache(format!("failed to encode cache entry: {e}")))?;
        let mut conn = self.conn.clone();
        match self.ttl_secs {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(self.key(key), value, ttl)
                .await
                .map_err(cache_err),
            None => conn
                .set::<_, _, ()>(self.key(key), value)
                .await
                .map_err(cache_err),
        }
    }

    async fn remove(&self, keys: &[u64]) -> CoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = keys.iter().map(|k| self.key(*k)).collect();
        let mut conn = self.conn.clone();
        let removed: usize = conn.del(names).await.map_err(cache_err)?;
        tracing::debug!(requested = keys.len(), removed, "Cache keys purged");
        Ok(())
    }
}
