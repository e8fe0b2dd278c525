//! PostgreSQL friendship edges.

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::UserId;
use filmorate_friendship::domain::aggregates::{EdgeState, FriendshipStatus};
use filmorate_friendship::domain::repository::{FriendEdge, FriendshipRepository};
use sqlx::{PgConnection, PgPool};

use super::feed::insert_events;
use super::{advisory_lock, db_error};

use crate::stale_commit;

/// Friendship edges stored in the `friendships` table.
#[derive(Debug, Clone)]
pub struct PgFriendships {
    pool: PgPool,
}

impl PgFriendships {
    /// Creates a new `PgFriendships`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn read_pair(
    conn: &mut PgConnection,
    owner_id: UserId,
    target_id: UserId,
) -> Result<EdgeState, DomainError> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT owner_id, status FROM friendships \
         WHERE (owner_id = $1 AND target_id = $2) OR (owner_id = $2 AND target_id = $1)",
    )
    .bind(owner_id.get())
    .bind(target_id.get())
    .fetch_all(conn)
    .await
    .map_err(db_error)?;

    let mut state = EdgeState::default();
    for (owner, status) in rows {
        let status: FriendshipStatus = status.parse()?;
        if owner == owner_id.get() {
            state.forward = Some(status);
        } else {
            state.reverse = Some(status);
        }
    }
    Ok(state)
}

async fn write_edge(
    conn: &mut PgConnection,
    owner_id: UserId,
    target_id: UserId,
    status: Option<FriendshipStatus>,
) -> Result<(), DomainError> {
    let query = match status {
        Some(status) => sqlx::query(
            "INSERT INTO friendships (owner_id, target_id, status) VALUES ($1, $2, $3) \
             ON CONFLICT (owner_id, target_id) DO UPDATE SET status = EXCLUDED.status",
        )
        .bind(owner_id.get())
        .bind(target_id.get())
        .bind(status.as_str()),
        None => sqlx::query("DELETE FROM friendships WHERE owner_id = $1 AND target_id = $2")
            .bind(owner_id.get())
            .bind(target_id.get()),
    };
    query.execute(conn).await.map_err(db_error)?;
    Ok(())
}

#[async_trait]
impl FriendshipRepository for PgFriendships {
    async fn load_pair(
        &self,
        owner_id: UserId,
        target_id: UserId,
    ) -> Result<EdgeState, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        read_pair(&mut conn, owner_id, target_id).await
    }

    async fn commit_pair(
        &self,
        owner_id: UserId,
        target_id: UserId,
        expected: EdgeState,
        next: EdgeState,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let (low, high) = (owner_id.min(target_id), owner_id.max(target_id));
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        advisory_lock(&mut tx, &format!("friendship:{low}:{high}")).await?;

        if read_pair(&mut tx, owner_id, target_id).await? != expected {
            return Err(stale_commit(format!(
                "friendship {owner_id}->{target_id}"
            )));
        }
        if next.forward != expected.forward {
            write_edge(&mut tx, owner_id, target_id, next.forward).await?;
        }
        if next.reverse != expected.reverse {
            write_edge(&mut tx, target_id, owner_id, next.reverse).await?;
        }
        let recorded = insert_events(&mut tx, events).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn friends_of(&self, owner_id: UserId) -> Result<Vec<FriendEdge>, DomainError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT target_id, status FROM friendships WHERE owner_id = $1")
                .bind(owner_id.get())
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
        rows.into_iter()
            .map(|(target_id, status)| {
                Ok(FriendEdge {
                    owner_id,
                    target_id: UserId(target_id),
                    status: status.parse()?,
                })
            })
            .collect()
    }
}
