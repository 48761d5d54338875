//! The event-store seam used by the stats service.
//!
//! The service only needs to count and append, so it depends on this trait
//! rather than on a pool. [`PgEventStore`] is the PostgreSQL implementation;
//! tests substitute an in-memory one.

use async_trait::async_trait;
use opsview_core::event::NewEvent;
use opsview_core::types::DbId;

use crate::repositories::EventRepo;
use crate::DbPool;

/// Source of truth for the event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Number of events currently in the log.
    async fn count_events(&self) -> Result<i64, sqlx::Error>;

    /// Append an event, returning its assigned ID.
    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, sqlx::Error>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// [`EventStore`] backed by the `events` table.
#[derive(Clone)]
pub struct PgEventStore {
    pool: DbPool,
}

impl PgEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn count_events(&self) -> Result<i64, sqlx::Error> {
        EventRepo::count(&self.pool).await
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(&self.pool, event).await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}
