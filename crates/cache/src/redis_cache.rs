//! Redis-backed [`CacheStore`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use crate::{CacheError, CacheStore};

/// Upper bound on a single cache operation, connecting included.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(500);

/// Cache backed by a Redis server.
///
/// The connection is established on first use and then shared: the
/// [`ConnectionManager`] multiplexes requests and reconnects on its own
/// after a dropped connection. If Redis is down at startup the first
/// operation fails and the next one tries again.
///
/// Every operation, including the connect it may trigger, is bounded by the
/// operation timeout. A server that accepts connections but never answers
/// yields [`CacheError::Unavailable`] instead of a stalled caller.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisCache {
    /// Parse the Redis URL. Does not connect.
    pub fn open(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            conn: OnceCell::new(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        })
    }

    /// Replace the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Establish the shared connection now instead of on first use.
    pub async fn connect(&self) -> Result<(), CacheError> {
        self.bounded("CONNECT", async { self.connection().await.map(|_| ()) })
            .await
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Unavailable(format!(
                "{op} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?;
        Ok(conn.clone())
    }
}

/// Redis `EX` takes whole seconds; sub-second TTLs round up to one.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded("GET", async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.bounded("SET", async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl)).await?;
            Ok(())
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.bounded("DEL", async {
            let mut conn = self.connection().await?;
            conn.del::<_, ()>(key).await?;
            Ok(())
        })
        .await
    }
}
