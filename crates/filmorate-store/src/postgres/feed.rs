//! PostgreSQL event log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{EventId, UserId};
use filmorate_core::repository::FeedRepository;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::db_error;

type EventRow = (i64, DateTime<Utc>, i64, String, String, i64, Uuid);

fn from_row(row: EventRow) -> Result<FeedEvent, DomainError> {
    let (event_id, timestamp, user_id, event_type, operation, entity_id, correlation_id) = row;
    let corrupt =
        |err: DomainError| DomainError::Internal(format!("corrupt event {event_id}: {err}"));
    Ok(FeedEvent {
        event_id: EventId(event_id),
        timestamp,
        user_id: UserId(user_id),
        event_type: event_type.parse().map_err(corrupt)?,
        operation: operation.parse().map_err(corrupt)?,
        entity_id,
        correlation_id,
    })
}

/// Inserts `events` on `conn`, inside whatever transaction it is running.
pub(crate) async fn insert_events(
    conn: &mut PgConnection,
    events: &[NewEvent],
) -> Result<Vec<FeedEvent>, DomainError> {
    let mut recorded = Vec::with_capacity(events.len());
    for event in events {
        let event_id: i64 = sqlx::query_scalar(
            "INSERT INTO events (occurred_at, user_id, event_type, operation, entity_id, correlation_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING event_id",
        )
        .bind(event.occurred_at)
        .bind(event.user_id.get())
        .bind(event.event_type.as_str())
        .bind(event.operation.as_str())
        .bind(event.entity_id)
        .bind(event.correlation_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error)?;
        recorded.push(event.clone().into_recorded(EventId(event_id)));
    }
    Ok(recorded)
}

/// Event log stored in the `events` table.
#[derive(Debug, Clone)]
pub struct PgFeed {
    pool: PgPool,
}

impl PgFeed {
    /// Creates a new `PgFeed`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedRepository for PgFeed {
    async fn append(&self, event: NewEvent) -> Result<FeedEvent, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let mut recorded = insert_events(&mut *conn, std::slice::from_ref(&event)).await?;
        recorded
            .pop()
            .ok_or_else(|| DomainError::Internal("event was not recorded".into()))
    }

    async fn load_feed(&self, user_id: UserId) -> Result<Vec<FeedEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, occurred_at, user_id, event_type, operation, entity_id, correlation_id \
             FROM events WHERE user_id = $1 ORDER BY occurred_at, event_id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(from_row).collect()
    }
}
