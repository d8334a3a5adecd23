//! Redis-backed fast-path cache.
//!
//! [`RedisCache`] implements `banner_core::FastPathCache` over a multiplexed
//! [`redis::aio::ConnectionManager`], which reconnects on its own after a
//! dropped connection. Content is stored as JSON under `{prefix}:{hash}`.

pub mod config;
pub mod redis_cache;

pub use config::{CacheConfig, CacheConfigError};
pub use redis_cache::RedisCache;
