use banner_cache::{CacheConfig, CacheConfigError};
use banner_core::CachePolicy;

/// Default PostgreSQL pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Cache(#[from] CacheConfigError),
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
    /// Redis settings, see [`CacheConfig::from_env`].
    pub cache: CacheConfig,
    /// Cache synchronization applied by the engine.
    pub policy: CachePolicy,
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `DATABASE_URL`              | (required) |
    /// | `DB_MAX_CONNECTIONS`        | `20`       |
    /// | `CACHE_INVALIDATE_ON_WRITE` | `true`     |
    ///
    /// Redis variables are documented on [`CacheConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ServiceConfig::from_env`], reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DB_MAX_CONNECTIONS",
                        value: raw,
                        expected: "a positive integer",
                    })
                }
            },
        };

        let invalidate_on_write = match lookup("CACHE_INVALIDATE_ON_WRITE") {
            None => CachePolicy::default().invalidate_on_write,
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                var: "CACHE_INVALIDATE_ON_WRITE",
                value: raw,
                expected: "true or false",
            })?,
        };

        let cache = CacheConfig::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            max_connections,
            cache,
            policy: CachePolicy {
                invalidate_on_write,
            },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
