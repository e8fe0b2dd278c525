//! Storage abstractions for reviews and their votes.

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use serde::Serialize;

use super::aggregates::{Review, VoteChange, VoteKind};

/// Vote counts for one review, computed from the vote rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    /// Number of positive votes.
    pub positive: i64,
    /// Number of negative votes.
    pub negative: i64,
}

impl VoteTally {
    /// The score the tally implies.
    #[must_use]
    pub fn useful(self) -> i64 {
        self.positive - self.negative
    }
}

/// Outcome of recomputing a cached score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReconciliation {
    /// The score stored before reconciliation.
    pub cached: i64,
    /// The score recomputed from votes, now stored.
    pub recomputed: i64,
}

/// Repository for review records.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reserves the identifier for a review about to be created.
    async fn next_review_id(&self) -> Result<ReviewId, DomainError>;

    /// Stores a new review and records its event, atomically.
    async fn insert_review(&self, review: &Review, event: NewEvent)
    -> Result<FeedEvent, DomainError>;

    /// Stores a review's new content and polarity and records its event,
    /// atomically. The stored score is not touched.
    ///
    /// Fails with `DomainError::NotFound` if the review no longer exists.
    async fn update_review(&self, review: &Review, event: NewEvent)
    -> Result<FeedEvent, DomainError>;

    /// Deletes a review with all its votes and records its event, atomically.
    ///
    /// Fails with `DomainError::NotFound` if the review no longer exists.
    async fn delete_review(
        &self,
        review_id: ReviewId,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError>;

    /// Loads a review with its current cached score.
    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>, DomainError>;

    /// Lists up to `limit` reviews, optionally for one film, ordered by
    /// score descending then id ascending.
    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: usize,
    ) -> Result<Vec<Review>, DomainError>;
}

/// Repository for the vote ledger and the score it caches.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Loads one user's vote on a review.
    async fn load_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<Option<VoteKind>, DomainError>;

    /// Replaces the vote, adjusts the review's score by `change.delta`, and
    /// records `events`, atomically.
    ///
    /// Fails with `DomainError::ConcurrencyConflict` without writing if the
    /// stored vote no longer equals `change.expected`, and with
    /// `DomainError::NotFound` if the review no longer exists.
    async fn commit_vote(
        &self,
        change: VoteChange,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError>;

    /// Counts the stored votes on a review.
    async fn tally(&self, review_id: ReviewId) -> Result<VoteTally, DomainError>;

    /// Recomputes the review's score from its votes and stores it.
    async fn reconcile_useful(
        &self,
        review_id: ReviewId,
    ) -> Result<ScoreReconciliation, DomainError>;
}
