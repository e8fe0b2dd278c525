//! PostgreSQL reviews and vote ledger.

use async_trait::async_trait;
use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use filmorate_reviews::domain::aggregates::{Review, VoteChange, VoteKind};
use filmorate_reviews::domain::repository::{
    ReviewRepository, ScoreReconciliation, VoteRepository, VoteTally,
};
use sqlx::{PgConnection, PgPool};

use super::db_error;
use super::feed::insert_events;

use crate::stale_commit;

type ReviewRow = (i64, String, bool, i64, i64, i64);

fn from_row((review_id, content, is_positive, user_id, film_id, useful): ReviewRow) -> Review {
    Review {
        review_id: ReviewId(review_id),
        content,
        is_positive,
        user_id: UserId(user_id),
        film_id: FilmId(film_id),
        useful,
    }
}

const REVIEW_COLUMNS: &str = "review_id, content, is_positive, user_id, film_id, useful";

/// Reviews and votes stored in the `reviews` and `review_votes` tables.
#[derive(Debug, Clone)]
pub struct PgReviews {
    pool: PgPool,
}

impl PgReviews {
    /// Creates a new `PgReviews`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks the review row, guarding its votes and score until the
/// transaction ends. Returns the cached score.
async fn lock_review(conn: &mut PgConnection, review_id: ReviewId) -> Result<i64, DomainError> {
    sqlx::query_scalar("SELECT useful FROM reviews WHERE review_id = $1 FOR UPDATE")
        .bind(review_id.get())
        .fetch_optional(conn)
        .await
        .map_err(db_error)?
        .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))
}

async fn read_vote(
    conn: &mut PgConnection,
    review_id: ReviewId,
    user_id: UserId,
) -> Result<Option<VoteKind>, DomainError> {
    let is_positive: Option<bool> = sqlx::query_scalar(
        "SELECT is_positive FROM review_votes WHERE review_id = $1 AND user_id = $2",
    )
    .bind(review_id.get())
    .bind(user_id.get())
    .fetch_optional(conn)
    .await
    .map_err(db_error)?;
    Ok(is_positive.map(VoteKind::from_positive))
}

async fn single_event(
    conn: &mut PgConnection,
    event: NewEvent,
) -> Result<FeedEvent, DomainError> {
    insert_events(conn, std::slice::from_ref(&event))
        .await?
        .pop()
        .ok_or_else(|| DomainError::Internal("event was not recorded".into()))
}

#[async_trait]
impl ReviewRepository for PgReviews {
    async fn next_review_id(&self) -> Result<ReviewId, DomainError> {
        let id: i64 =
            sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('reviews', 'review_id'))")
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(ReviewId(id))
    }

    async fn insert_review(
        &self,
        review: &Review,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query(
            "INSERT INTO reviews (review_id, content, is_positive, user_id, film_id, useful) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(review.review_id.get())
        .bind(&review.content)
        .bind(review.is_positive)
        .bind(review.user_id.get())
        .bind(review.film_id.get())
        .bind(review.useful)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        let recorded = single_event(&mut tx, event).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn update_review(
        &self,
        review: &Review,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let updated = sqlx::query(
            "UPDATE reviews SET content = $2, is_positive = $3 WHERE review_id = $1",
        )
        .bind(review.review_id.get())
        .bind(&review.content)
        .bind(review.is_positive)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        if updated.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Review, review.review_id));
        }
        let recorded = single_event(&mut tx, event).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn delete_review(
        &self,
        review_id: ReviewId,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let deleted = sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(review_id.get())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        if deleted.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Review, review_id));
        }
        let recorded = single_event(&mut tx, event).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>, DomainError> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1"
        ))
        .bind(review_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(from_row))
    }

    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: usize,
    ) -> Result<Vec<Review>, DomainError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE $1::BIGINT IS NULL OR film_id = $1 \
             ORDER BY useful DESC, review_id ASC LIMIT $2"
        ))
        .bind(film_id.map(FilmId::get))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(from_row).collect())
    }
}

#[async_trait]
impl VoteRepository for PgReviews {
    async fn load_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<Option<VoteKind>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        read_vote(&mut conn, review_id, user_id).await
    }

    async fn commit_vote(
        &self,
        change: VoteChange,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let (review_id, user_id) = (change.key.review_id, change.key.user_id);
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        lock_review(&mut tx, review_id).await?;

        if read_vote(&mut tx, review_id, user_id).await? != change.expected {
            return Err(stale_commit(change.key.to_string()));
        }
        match change.next {
            Some(kind) => {
                sqlx::query(
                    "INSERT INTO review_votes (review_id, user_id, is_positive) VALUES ($1, $2, $3) \
                     ON CONFLICT (review_id, user_id) DO UPDATE SET is_positive = EXCLUDED.is_positive",
                )
                .bind(review_id.get())
                .bind(user_id.get())
                .bind(kind.is_positive())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            }
            None => {
                sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
                    .bind(review_id.get())
                    .bind(user_id.get())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }
        }
        sqlx::query("UPDATE reviews SET useful = useful + $2 WHERE review_id = $1")
            .bind(review_id.get())
            .bind(change.delta)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let recorded = insert_events(&mut tx, events).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(recorded)
    }

    async fn tally(&self, review_id: ReviewId) -> Result<VoteTally, DomainError> {
        let (positive, negative): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE is_positive), COUNT(*) FILTER (WHERE NOT is_positive) \
             FROM review_votes WHERE review_id = $1",
        )
        .bind(review_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(VoteTally { positive, negative })
    }

    async fn reconcile_useful(
        &self,
        review_id: ReviewId,
    ) -> Result<ScoreReconciliation, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let cached = lock_review(&mut tx, review_id).await?;
        let recomputed: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE WHEN is_positive THEN 1 ELSE -1 END), 0)::BIGINT \
             FROM review_votes WHERE review_id = $1",
        )
        .bind(review_id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;
        sqlx::query("UPDATE reviews SET useful = $2 WHERE review_id = $1")
            .bind(review_id.get())
            .bind(recomputed)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        Ok(ScoreReconciliation { cached, recomputed })
    }
}
