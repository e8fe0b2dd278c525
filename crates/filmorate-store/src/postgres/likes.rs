//! PostgreSQL like relation.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, UserId};
use filmorate_likes::domain::repository::LikeRepository;
use sqlx::{PgConnection, PgPool};

use super::feed::insert_events;
use super::{advisory_lock, db_error};

use crate::stale_commit;

/// Likes stored in the `film_likes` table.
#[derive(Debug, Clone)]
pub struct PgLikes {
    pool: PgPool,
}

impl PgLikes {
    /// Creates a new `PgLikes`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn like_exists(
    conn: &mut PgConnection,
    film_id: FilmId,
    user_id: UserId,
) -> Result<bool, DomainError> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM film_likes WHERE film_id = $1 AND user_id = $2)",
    )
    .bind(film_id.get())
    .bind(user_id.get())
    .fetch_one(conn)
    .await
    .map_err(db_error)
}

#[async_trait]
impl LikeRepository for PgLikes {
    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> Result<bool, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        like_exists(&mut conn, film_id, user_id).await
    }

    async fn commit_like(
        &self,
        film_id: FilmId,
        user_id: UserId,
        expected: bool,
        next: bool,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        advisory_lock(&mut tx, &format!("like:{film_id}:{user_id}")).await?;

        if like_exists(&mut tx, film_id, user_id).await? != expected {
            return Err(stale_commit(format!(
                "film {film_id} by user {user_id}"
            )));
        }
        let statement = if next {
            "INSERT INTO film_likes (film_id, user_id) VALUES ($1, $2)"
        } else {
            "DELETE FROM film_likes WHERE film_id = $1 AND user_id = $2"
        };
        if next != expected {
            sqlx::query(statement)
                .bind(film_id.get())
                .bind(user_id.get())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }
        let recorded = insert_events(&mut tx, events).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn liked_films(&self, user_id: UserId) -> Result<BTreeSet<FilmId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT film_id FROM film_likes WHERE user_id = $1")
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(ids.into_iter().map(FilmId).collect())
    }

    async fn users_who_liked(&self, film_id: FilmId) -> Result<BTreeSet<UserId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM film_likes WHERE film_id = $1")
            .bind(film_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(ids.into_iter().map(UserId).collect())
    }

    async fn co_likers(&self, user_id: UserId) -> Result<BTreeMap<UserId, usize>, DomainError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT other.user_id, COUNT(*) FROM film_likes mine \
             JOIN film_likes other \
               ON other.film_id = mine.film_id AND other.user_id <> mine.user_id \
             WHERE mine.user_id = $1 \
             GROUP BY other.user_id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(other, count)| {
                usize::try_from(count)
                    .map(|count| (UserId(other), count))
                    .map_err(|_| DomainError::Internal(format!("negative overlap count {count}")))
            })
            .collect()
    }
}
