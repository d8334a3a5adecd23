//! Integration tests for `RedisCache` against a live server.
//!
//! Each test runs only when `REDIS_URL` is set and returns early otherwise.
//! Every test writes under its own key prefix so tests can share a server.

use std::sync::Arc;

use banner_cache::{CacheConfig, RedisCache};
use banner_core::memory::MemoryContentStore;
use banner_core::{BannerContent, BannerEngine, FastPathCache, FeatureTag, NewBanner};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(test: &str, ttl_secs: Option<u64>) -> Option<CacheConfig> {
    let Ok(url) = std::env::var("REDIS_URL") else {
        eprintln!("REDIS_URL not set, skipping {test}");
        return None;
    };
    Some(CacheConfig {
        url,
        ttl_secs,
        key_prefix: format!("banner-test:{test}:{}", std::process::id()),
    })
}

async fn connect(config: &CacheConfig) -> RedisCache {
    let cache = RedisCache::connect(config).await.unwrap();
    cache.ping().await.unwrap();
    cache
}

async fn raw_connection(config: &CacheConfig) -> redis::aio::MultiplexedConnection {
    redis::Client::open(config.url.as_str())
        .unwrap()
        .get_multiplexed_async_connection()
        .await
        .unwrap()
}

fn content(title: &str) -> BannerContent {
    BannerContent::new(title, format!("{title} body"), format!("https://example.com/{title}"))
}

// ---------------------------------------------------------------------------
// FastPathCache contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_key_is_none() {
    let Some(config) = config("missing", None) else {
        return;
    };
    let cache = connect(&config).await;

    let found = cache.get(FeatureTag::new(1, 1).cache_key()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_put_then_get_round_trips() {
    let Some(config) = config("round_trip", None) else {
        return;
    };
    let cache = connect(&config).await;
    let key = FeatureTag::new(1, 1).cache_key();

    cache.put(key, &content("A")).await.unwrap();
    assert_eq!(cache.get(key).await.unwrap(), Some(content("A")));

    cache.put(key, &content("B")).await.unwrap();
    assert_eq!(cache.get(key).await.unwrap(), Some(content("B")));

    cache.remove(&[key]).await.unwrap();
}

#[tokio::test]
async fn test_remove_purges_every_key() {
    let Some(config) = config("purge", None) else {
        return;
    };
    let cache = connect(&config).await;
    let keys: Vec<u64> = (1..=3).map(|tag| FeatureTag::new(1, tag).cache_key()).collect();
    let kept = FeatureTag::new(2, 1).cache_key();

    for key in &keys {
        cache.put(*key, &content("A")).await.unwrap();
    }
    cache.put(kept, &content("B")).await.unwrap();

    // Absent keys are ignored.
    let mut purge = keys.clone();
    purge.push(FeatureTag::new(9, 9).cache_key());
    cache.remove(&purge).await.unwrap();
    cache.remove(&[]).await.unwrap();

    for key in &keys {
        assert!(cache.get(*key).await.unwrap().is_none());
    }
    assert_eq!(cache.get(kept).await.unwrap(), Some(content("B")));

    cache.remove(&[kept]).await.unwrap();
}

#[tokio::test]
async fn test_ttl_is_applied_when_configured() {
    let Some(config) = config("ttl", Some(120)) else {
        return;
    };
    let cache = connect(&config).await;
    let key = FeatureTag::new(1, 1).cache_key();
    cache.put(key, &content("A")).await.unwrap();

    let mut conn = raw_connection(&config).await;
    let ttl: i64 = redis::cmd("TTL")
        .arg(cache.key(key))
        .query_async(&mut conn)
        .await
        .unwrap();
    assert!(ttl > 0 && ttl <= 120, "unexpected ttl {ttl}");

    cache.remove(&[key]).await.unwrap();
}

#[tokio::test]
async fn test_no_ttl_means_no_expiry() {
    let Some(config) = config("no_ttl", None) else {
        return;
    };
    let cache = connect(&config).await;
    let key = FeatureTag::new(1, 1).cache_key();
    cache.put(key, &content("A")).await.unwrap();

    let mut conn = raw_connection(&config).await;
    let ttl: i64 = redis::cmd("TTL")
        .arg(cache.key(key))
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(ttl, -1);

    cache.remove(&[key]).await.unwrap();
}

#[tokio::test]
async fn test_corrupt_entry_is_cache_error() {
    let Some(config) = config("corrupt", None) else {
        return;
    };
    let cache = connect(&config).await;
    let key = FeatureTag::new(1, 1).cache_key();

    let mut conn = raw_connection(&config).await;
    let _: () = redis::cmd("SET")
        .arg(cache.key(key))
        .arg("not json")
        .query_async(&mut conn)
        .await
        .unwrap();

    let err = cache.get(key).await.unwrap_err();
    assert!(err.to_string().contains("corrupt cache entry"));

    cache.remove(&[key]).await.unwrap();
}

// ---------------------------------------------------------------------------
// Engine over Redis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_engine_cache_reads_follow_delete() {
    let Some(config) = config("engine", None) else {
        return;
    };
    let engine = BannerEngine::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(connect(&config).await),
    );
    let key = FeatureTag::new(1, 1);

    let id = engine
        .create_banner(&NewBanner {
            feature_id: 1,
            tag_id: 1,
            content: content("A"),
            is_active: true,
        })
        .await
        .unwrap();
    assert!(engine.get_banner_from_cache(key).await.unwrap_err().is_not_found());

    engine.get_banner(key).await.unwrap();
    assert_eq!(engine.get_banner_from_cache(key).await.unwrap(), content("A"));

    engine.delete_banner(id).await.unwrap();
    assert!(engine.get_banner_from_cache(key).await.unwrap_err().is_not_found());
}
