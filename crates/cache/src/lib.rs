//! String key/value cache used for the stats snapshot.
//!
//! The stats service needs exactly three operations: read a key, write a key
//! with an expiration, and delete a key. [`CacheStore`] captures that
//! contract; [`RedisCache`] and [`MemoryCache`] implement it.

use std::time::Duration;

use async_trait::async_trait;

pub mod memory;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Errors raised by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Minimal cache contract: `GET`, `SET ... EX`, `DEL` on string keys.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs (`"redis"`, `"memory"`).
    fn backend(&self) -> &'static str;

    /// Read a key. Missing and expired keys both yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a key that expires after `ttl`, replacing any previous value.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}
