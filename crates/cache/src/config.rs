/// Default Redis endpoint for local development.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default namespace for cache keys.
pub const DEFAULT_KEY_PREFIX: &str = "banner";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidTtl { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    EmptyPrefix { var: &'static str },
}

/// Redis cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Connection URL (default: `redis://127.0.0.1:6379`).
    pub url: String,
    /// Entry expiry in seconds. `None` keeps entries until purged.
    pub ttl_secs: Option<u64>,
    /// Namespace prepended to every key (default: `banner`).
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.into(),
            ttl_secs: None,
            key_prefix: DEFAULT_KEY_PREFIX.into(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                  |
    /// |--------------------|--------------------------|
    /// | `REDIS_URL`        | `redis://127.0.0.1:6379` |
    /// | `CACHE_TTL_SECS`   | unset (no expiry)        |
    /// | `CACHE_KEY_PREFIX` | `banner`                 |
    pub fn from_env() -> Result<Self, CacheConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`CacheConfig::from_env`], reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CacheConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.into());

        let ttl_secs = match lookup("CACHE_TTL_SECS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                _ => {
                    return Err(CacheConfigError::InvalidTtl {
                        var: "CACHE_TTL_SECS",
                        value: raw,
                    })
                }
            },
        };

        let key_prefix = lookup("CACHE_KEY_PREFIX").unwrap_or_else(|| DEFAULT_KEY_PREFIX.into());
        if key_prefix.trim().is_empty() {
            return Err(CacheConfigError::EmptyPrefix {
                var: "CACHE_KEY_PREFIX",
            });
        }

        Ok(Self {
            url,
            ttl_secs,
            key_prefix,
        })
    }
}
