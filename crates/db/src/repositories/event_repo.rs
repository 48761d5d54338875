//! Repository for the `events` table.

use opsview_core::event::NewEvent;
use opsview_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::Event;

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "id, type, payload, created_at";

/// Provides read/write operations for the append-only event log.
pub struct EventRepo;

impl EventRepo {
    /// Count every row in the event log.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
    }

    /// Insert a new event row, returning the generated ID.
    pub async fn insert(pool: &PgPool, input: &NewEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO events (type, payload) VALUES ($1, $2) RETURNING id")
            .bind(&input.event_type)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    /// Find a single event by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List recent events ordered newest-first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
