//! In-memory reviews and vote ledger.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use filmorate_reviews::domain::aggregates::{Review, VoteChange, VoteKind, contribution};
use filmorate_reviews::domain::repository::{
    ReviewRepository, ScoreReconciliation, VoteRepository, VoteTally,
};

use super::feed::MemoryFeed;
use super::shard::Sharded;

use crate::stale_commit;

/// A review together with the votes cast on it.
#[derive(Debug)]
struct Entry {
    review: Review,
    votes: HashMap<UserId, VoteKind>,
}

type Entries = HashMap<ReviewId, Entry>;

fn entry_mut(entries: &mut Entries, review_id: ReviewId) -> Result<&mut Entry, DomainError> {
    entries
        .get_mut(&review_id)
        .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))
}

/// Reviews striped by review id. A review's votes live in the same entry as
/// its cached score, so a vote change and its score delta share one lock.
#[derive(Debug)]
pub struct MemoryReviews {
    entries: Sharded<Entries>,
    next_review_id: AtomicI64,
    feed: Arc<MemoryFeed>,
}

impl MemoryReviews {
    /// Creates an empty review store that records events into `feed`.
    #[must_use]
    pub fn new(feed: Arc<MemoryFeed>) -> Self {
        Self {
            entries: Sharded::new("reviews"),
            next_review_id: AtomicI64::new(1),
            feed,
        }
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviews {
    async fn next_review_id(&self) -> Result<ReviewId, DomainError> {
        Ok(ReviewId(self.next_review_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn insert_review(
        &self,
        review: &Review,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut entries = self.entries.lock(&review.review_id)?;
        if entries.contains_key(&review.review_id) {
            return Err(DomainError::Conflict(format!(
                "review {} already exists",
                review.review_id
            )));
        }
        let recorded = self.feed.record(std::slice::from_ref(&event))?;
        entries.insert(
            review.review_id,
            Entry {
                review: review.clone(),
                votes: HashMap::new(),
            },
        );
        first(recorded)
    }

    async fn update_review(
        &self,
        review: &Review,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut entries = self.entries.lock(&review.review_id)?;
        let entry = entry_mut(&mut entries, review.review_id)?;
        let recorded = self.feed.record(std::slice::from_ref(&event))?;
        entry.review.content.clone_from(&review.content);
        entry.review.is_positive = review.is_positive;
        first(recorded)
    }

    async fn delete_review(
        &self,
        review_id: ReviewId,
        event: NewEvent,
    ) -> Result<FeedEvent, DomainError> {
        let mut entries = self.entries.lock(&review_id)?;
        entry_mut(&mut entries, review_id)?;
        let recorded = self.feed.record(std::slice::from_ref(&event))?;
        entries.remove(&review_id);
        first(recorded)
    }

    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>, DomainError> {
        let entries = self.entries.lock(&review_id)?;
        Ok(entries.get(&review_id).map(|e| e.review.clone()))
    }

    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: usize,
    ) -> Result<Vec<Review>, DomainError> {
        let mut reviews = Vec::new();
        self.entries.scan(|entries| {
            reviews.extend(
                entries
                    .values()
                    .filter(|e| film_id.is_none_or(|f| e.review.film_id == f))
                    .map(|e| e.review.clone()),
            );
        })?;
        reviews.sort_by(|a, b| {
            b.useful
                .cmp(&a.useful)
                .then_with(|| a.review_id.cmp(&b.review_id))
        });
        reviews.truncate(limit);
        Ok(reviews)
    }
}

fn first(recorded: Vec<FeedEvent>) -> Result<FeedEvent, DomainError> {
    recorded
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::Internal("event was not recorded".into()))
}

#[async_trait]
impl VoteRepository for MemoryReviews {
    async fn load_vote(
        &self,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<Option<VoteKind>, DomainError> {
        let entries = self.entries.lock(&review_id)?;
        Ok(entries
            .get(&review_id)
            .and_then(|e| e.votes.get(&user_id).copied()))
    }

    async fn commit_vote(
        &self,
        change: VoteChange,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let review_id = change.key.review_id;
        let mut entries = self.entries.lock(&review_id)?;
        let entry = entry_mut(&mut entries, review_id)?;
        if entry.votes.get(&change.key.user_id).copied() != change.expected {
            return Err(stale_commit(change.key.to_string()));
        }
        let recorded = self.feed.record(events)?;
        match change.next {
            Some(kind) => {
                entry.votes.insert(change.key.user_id, kind);
            }
            None => {
                entry.votes.remove(&change.key.user_id);
            }
        }
        entry.review.useful += change.delta;
        Ok(recorded)
    }

    async fn tally(&self, review_id: ReviewId) -> Result<VoteTally, DomainError> {
        let entries = self.entries.lock(&review_id)?;
        let mut tally = VoteTally::default();
        for kind in entries.get(&review_id).into_iter().flat_map(|e| e.votes.values()) {
            match kind {
                VoteKind::Positive => tally.positive += 1,
                VoteKind::Negative => tally.negative += 1,
            }
        }
        Ok(tally)
    }

    async fn reconcile_useful(
        &self,
        review_id: ReviewId,
    ) -> Result<ScoreReconciliation, DomainError> {
        let mut entries = self.entries.lock(&review_id)?;
        let entry = entry_mut(&mut entries, review_id)?;
        let recomputed = entry.votes.values().map(|k| contribution(Some(*k))).sum();
        let cached = std::mem::replace(&mut entry.review.useful, recomputed);
        Ok(ScoreReconciliation { cached, recomputed })
    }
}
