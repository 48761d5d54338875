use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use opsview_cache::redis_cache::DEFAULT_OPERATION_TIMEOUT;
use opsview_core::stats::DEFAULT_STATS_TTL;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string. When unset the stats cache lives in-process.
    pub redis_url: Option<String>,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of the cached stats snapshot in seconds (default: `10`).
    pub stats_cache_ttl_secs: u64,
    /// Upper bound on a single Redis operation in milliseconds (default: `500`).
    pub cache_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `DATABASE_URL`         | required                   |
    /// | `REDIS_URL`            | unset (in-process cache)   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STATS_CACHE_TTL_SECS` | `10`                       |
    /// | `CACHE_TIMEOUT_MS`     | `500`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&lookup, "PORT", 3000u16)?;

        let database_url = non_empty(&lookup, "DATABASE_URL")
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let redis_url = non_empty(&lookup, "REDIS_URL");

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let stats_cache_ttl_secs =
            parse_or(&lookup, "STATS_CACHE_TTL_SECS", DEFAULT_STATS_TTL.as_secs())?;
        if stats_cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "STATS_CACHE_TTL_SECS",
                value: "0".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let cache_timeout_ms = parse_or(
            &lookup,
            "CACHE_TIMEOUT_MS",
            DEFAULT_OPERATION_TIMEOUT.as_millis() as u64,
        )?;
        if cache_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "CACHE_TIMEOUT_MS",
                value: "0".into(),
                reason: "must be at least 1 millisecond".into(),
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            redis_url,
            cors_origins,
            request_timeout_secs,
            stats_cache_ttl_secs,
            cache_timeout_ms,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stats_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_cache_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
