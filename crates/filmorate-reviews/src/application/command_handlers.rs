//! Command handlers for the Reviews context.
//!
//! Review edits are last-writer-wins on content. Votes go through the
//! `ReviewVote` aggregate and are committed with a compare-and-swap against
//! the loaded vote so the cached score never drifts from the vote rows.

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::command::Command;
use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::event::FeedEvent;
use filmorate_core::ids::ReviewId;
use filmorate_core::retry::retry_on_conflict;
use tracing::{info, warn};

use crate::domain::aggregates::{Review, ReviewVote, VoteKind};
use crate::domain::commands::{CreateReview, DeleteReview, RemoveVote, SetVote, UpdateReview};
use crate::domain::repository::{ReviewRepository, ScoreReconciliation, VoteRepository};

async fn load_review(
    review_id: ReviewId,
    repo: &dyn ReviewRepository,
) -> Result<Review, DomainError> {
    repo.get_review(review_id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))
}

async fn commit_vote(
    vote: &mut ReviewVote,
    repo: &dyn VoteRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    let events = vote.take_uncommitted_events();
    repo.commit_vote(vote.change(), &events).await
}

/// Handles the `CreateReview` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for blank content, or the
/// repository's error if storing fails.
pub async fn handle_create_review(
    command: &CreateReview,
    clock: &dyn Clock,
    repo: &dyn ReviewRepository,
) -> Result<(Review, FeedEvent), DomainError> {
    let review_id = repo.next_review_id().await?;
    let (review, event) = Review::create(
        review_id,
        command.content.clone(),
        command.is_positive,
        command.user_id,
        command.film_id,
        command.correlation_id,
        clock,
    )?;
    let recorded = repo.insert_review(&review, event).await?;
    info!(
        review_id = %review.review_id,
        film_id = %review.film_id,
        user_id = %review.user_id,
        "review created"
    );
    Ok((review, recorded))
}

/// Handles the `UpdateReview` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist,
/// `DomainError::InvalidArgument` for blank content, or the repository's
/// error if storing fails.
pub async fn handle_update_review(
    command: &UpdateReview,
    clock: &dyn Clock,
    repo: &dyn ReviewRepository,
) -> Result<(Review, FeedEvent), DomainError> {
    let mut review = load_review(command.review_id, repo).await?;
    let event = review.edit(
        command.content.clone(),
        command.is_positive,
        command.correlation_id,
        clock,
    )?;
    let recorded = repo.update_review(&review, event).await?;
    Ok((review, recorded))
}

/// Handles the `DeleteReview` command. The review's votes go with it.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist, or the
/// repository's error if deleting fails.
pub async fn handle_delete_review(
    command: &DeleteReview,
    clock: &dyn Clock,
    repo: &dyn ReviewRepository,
) -> Result<FeedEvent, DomainError> {
    let review = load_review(command.review_id, repo).await?;
    let event = review.deletion_event(command.correlation_id, clock);
    let recorded = repo.delete_review(review.review_id, event).await?;
    info!(review_id = %review.review_id, "review deleted");
    Ok(recorded)
}

/// Handles the `SetVote` command: casts a vote or flips an opposite one.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist,
/// `DomainError::Conflict` if the same vote was already cast, or the
/// repository's error if committing fails.
pub async fn handle_set_vote(
    command: &SetVote,
    clock: &dyn Clock,
    reviews: &dyn ReviewRepository,
    votes: &dyn VoteRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    load_review(command.review_id, reviews).await?;
    let kind = VoteKind::from_positive(command.is_positive);
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = votes.load_vote(command.review_id, command.user_id).await?;
        let mut vote = ReviewVote::load(command.review_id, command.user_id, loaded);
        vote.set(kind, command.correlation_id, clock)?;
        commit_vote(&mut vote, votes).await
    })
    .await
}

/// Handles the `RemoveVote` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review or the vote does not exist,
/// or the repository's error if committing fails.
pub async fn handle_remove_vote(
    command: &RemoveVote,
    clock: &dyn Clock,
    reviews: &dyn ReviewRepository,
    votes: &dyn VoteRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    load_review(command.review_id, reviews).await?;
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = votes.load_vote(command.review_id, command.user_id).await?;
        let mut vote = ReviewVote::load(command.review_id, command.user_id, loaded);
        vote.remove(command.correlation_id, clock)?;
        commit_vote(&mut vote, votes).await
    })
    .await
}

/// Recomputes a review's cached score from its vote rows and stores it.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist, or the
/// repository's error if the update fails.
pub async fn handle_reconcile_review_score(
    review_id: ReviewId,
    reviews: &dyn ReviewRepository,
    votes: &dyn VoteRepository,
) -> Result<ScoreReconciliation, DomainError> {
    load_review(review_id, reviews).await?;
    let outcome = votes.reconcile_useful(review_id).await?;
    if outcome.cached != outcome.recomputed {
        warn!(
            %review_id,
            cached = outcome.cached,
            recomputed = outcome.recomputed,
            "cached review score drifted from votes, repaired"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use filmorate_core::event::{EventOperation, EventType, NewEvent};
    use filmorate_core::ids::{EventId, FilmId, UserId};
    use filmorate_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::{VoteChange, contribution};
    use crate::domain::repository::VoteTally;

    /// Map-backed review and vote store. Optionally rejects the first N vote
    /// commits with a concurrency conflict.
    #[derive(Debug, Default)]
    pub(crate) struct MockReviewStore {
        reviews: Mutex<BTreeMap<ReviewId, Review>>,
        votes: Mutex<HashMap<(ReviewId, UserId), VoteKind>>,
        committed: Mutex<Vec<FeedEvent>>,
        conflicts_remaining: Mutex<u32>,
    }

    impl MockReviewStore {
        pub(crate) fn with_conflicts(conflicts: u32) -> Self {
            Self {
                conflicts_remaining: Mutex::new(conflicts),
                ..Self::default()
            }
        }

        pub(crate) fn committed(&self) -> Vec<FeedEvent> {
            self.committed.lock().unwrap().clone()
        }

        pub(crate) fn useful(&self, review_id: ReviewId) -> i64 {
            self.reviews.lock().unwrap()[&review_id].useful
        }

        pub(crate) fn corrupt_useful(&self, review_id: ReviewId, useful: i64) {
            self.reviews
                .lock()
                .unwrap()
                .get_mut(&review_id)
                .unwrap()
                .useful = useful;
        }

        fn record(&self, event: NewEvent) -> FeedEvent {
            let mut committed = self.committed.lock().unwrap();
            #[allow(clippy::cast_possible_wrap)]
            let id = EventId(committed.len() as i64 + 1);
            let recorded = event.into_recorded(id);
            committed.push(recorded.clone());
            recorded
        }
    }

    #[async_trait]
    impl ReviewRepository for MockReviewStore {
        async fn next_review_id(&self) -> Result<ReviewId, DomainError> {
            let reviews = self.reviews.lock().unwrap();
            Ok(ReviewId(reviews.keys().last().map_or(1, |id| id.get() + 1)))
        }

        async fn insert_review(
            &self,
            review: &Review,
            event: NewEvent,
        ) -> Result<FeedEvent, DomainError> {
            self.reviews
                .lock()
                .unwrap()
                .insert(review.review_id, review.clone());
            Ok(self.record(event))
        }

        async fn update_review(
            &self,
            review: &Review,
            event: NewEvent,
        ) -> Result<FeedEvent, DomainError> {
            {
                let mut reviews = self.reviews.lock().unwrap();
                let stored = reviews
                    .get_mut(&review.review_id)
                    .ok_or_else(|| DomainError::not_found(EntityKind::Review, review.review_id))?;
                stored.content.clone_from(&review.content);
                stored.is_positive = review.is_positive;
            }
            Ok(self.record(event))
        }

        async fn delete_review(
            &self,
            review_id: ReviewId,
            event: NewEvent,
        ) -> Result<FeedEvent, DomainError> {
            self.reviews
                .lock()
                .unwrap()
                .remove(&review_id)
                .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))?;
            self.votes
                .lock()
                .unwrap()
                .retain(|(review, _), _| *review != review_id);
            Ok(self.record(event))
        }

        async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>, DomainError> {
            Ok(self.reviews.lock().unwrap().get(&review_id).cloned())
        }

        async fn list_reviews(
            &self,
            film_id: Option<FilmId>,
            limit: usize,
        ) -> Result<Vec<Review>, DomainError> {
            let mut reviews: Vec<Review> = self
                .reviews
                .lock()
                .unwrap()
                .values()
                .filter(|r| film_id.is_none_or(|f| r.film_id == f))
                .cloned()
                .collect();
            reviews.sort_by(|a, b| b.useful.cmp(&a.useful).then(a.review_id.cmp(&b.review_id)));
            reviews.truncate(limit);
            Ok(reviews)
        }
    }

    #[async_trait]
    impl VoteRepository for MockReviewStore {
        async fn load_vote(
            &self,
            review_id: ReviewId,
            user_id: UserId,
        ) -> Result<Option<VoteKind>, DomainError> {
            Ok(self.votes.lock().unwrap().get(&(review_id, user_id)).copied())
        }

        async fn commit_vote(
            &self,
            change: VoteChange,
            events: &[NewEvent],
        ) -> Result<Vec<FeedEvent>, DomainError> {
            {
                let mut conflicts = self.conflicts_remaining.lock().unwrap();
                if *conflicts > 0 {
                    *conflicts -= 1;
                    return Err(DomainError::ConcurrencyConflict(change.key.to_string()));
                }
            }
            let key = (change.key.review_id, change.key.user_id);
            {
                let mut votes = self.votes.lock().unwrap();
                if votes.get(&key).copied() != change.expected {
                    return Err(DomainError::ConcurrencyConflict(change.key.to_string()));
                }
                let mut reviews = self.reviews.lock().unwrap();
                let review = reviews.get_mut(&change.key.review_id).ok_or_else(|| {
                    DomainError::not_found(EntityKind::Review, change.key.review_id)
                })?;
                review.useful += change.delta;
                match change.next {
                    Some(kind) => {
                        votes.insert(key, kind);
                    }
                    None => {
                        votes.remove(&key);
                    }
                }
            }
            Ok(events.iter().cloned().map(|e| self.record(e)).collect())
        }

        async fn tally(&self, review_id: ReviewId) -> Result<VoteTally, DomainError> {
            let votes = self.votes.lock().unwrap();
            let mut tally = VoteTally::default();
            for kind in votes
                .iter()
                .filter(|((review, _), _)| *review == review_id)
                .map(|(_, kind)| *kind)
            {
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
            let recomputed: i64 = self
                .votes
                .lock()
                .unwrap()
                .iter()
                .filter(|((review, _), _)| *review == review_id)
                .map(|(_, kind)| contribution(Some(*kind)))
                .sum();
            let mut reviews = self.reviews.lock().unwrap();
            let review = reviews
                .get_mut(&review_id)
                .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))?;
            let cached = review.useful;
            review.useful = recomputed;
            Ok(ScoreReconciliation { cached, recomputed })
        }
    }

    pub(crate) fn create(user: i64, film: i64, content: &str) -> CreateReview {
        CreateReview {
            correlation_id: Uuid::new_v4(),
            content: content.into(),
            is_positive: true,
            user_id: UserId(user),
            film_id: FilmId(film),
        }
    }

    fn vote(review: ReviewId, user: i64, is_positive: bool) -> SetVote {
        SetVote {
            correlation_id: Uuid::new_v4(),
            review_id: review,
            user_id: UserId(user),
            is_positive,
        }
    }

    fn unvote(review: ReviewId, user: i64) -> RemoveVote {
        RemoveVote {
            correlation_id: Uuid::new_v4(),
            review_id: review,
            user_id: UserId(user),
        }
    }

    async fn seeded_review(store: &MockReviewStore) -> ReviewId {
        let (review, _) = handle_create_review(&create(1, 1, "solid"), &FixedClock::default(), store)
            .await
            .unwrap();
        review.review_id
    }

    #[tokio::test]
    async fn test_handle_create_review_stores_review_and_event() {
        // Arrange
        let store = MockReviewStore::default();
        let command = create(2, 7, "A slow burn that pays off");

        // Act
        let (review, event) = handle_create_review(&command, &FixedClock::default(), &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(review.review_id, ReviewId(1));
        assert_eq!(review.useful, 0);
        assert_eq!(event.user_id, UserId(2));
        assert_eq!(event.event_type, EventType::Review);
        assert_eq!(event.operation, EventOperation::Add);
        assert_eq!(event.entity_id, 1);
        assert_eq!(event.correlation_id, command.correlation_id);
        assert!(store.get_review(ReviewId(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_handle_create_review_rejects_blank_content() {
        // Arrange
        let store = MockReviewStore::default();

        // Act
        let result = handle_create_review(&create(2, 7, ""), &FixedClock::default(), &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert!(store.committed().is_empty());
    }

    #[tokio::test]
    async fn test_handle_update_review_keeps_score_and_records_author() {
        // Arrange
        let clock = FixedClock::default();
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;
        handle_set_vote(&vote(review_id, 5, true), &clock, &store, &store)
            .await
            .unwrap();
        let command = UpdateReview {
            correlation_id: Uuid::new_v4(),
            review_id,
            content: "Better on rewatch".into(),
            is_positive: false,
        };

        // Act
        let (review, event) = handle_update_review(&command, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(review.content, "Better on rewatch");
        assert_eq!(review.useful, 1);
        assert_eq!(store.useful(review_id), 1);
        assert_eq!(event.user_id, UserId(1));
        assert_eq!(event.operation, EventOperation::Update);
    }

    #[tokio::test]
    async fn test_handle_update_review_unknown_review_is_not_found() {
        // Arrange
        let store = MockReviewStore::default();
        let command = UpdateReview {
            correlation_id: Uuid::new_v4(),
            review_id: ReviewId(42),
            content: "text".into(),
            is_positive: true,
        };

        // Act
        let result = handle_update_review(&command, &FixedClock::default(), &store).await;

        // Assert
        match result {
            Err(DomainError::NotFound { kind, key }) => {
                assert_eq!(kind, EntityKind::Review);
                assert_eq!(key, "42");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_delete_review_removes_review_and_votes() {
        // Arrange
        let clock = FixedClock::default();
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;
        handle_set_vote(&vote(review_id, 5, true), &clock, &store, &store)
            .await
            .unwrap();
        let command = DeleteReview {
            correlation_id: Uuid::new_v4(),
            review_id,
        };

        // Act
        let event = handle_delete_review(&command, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(event.operation, EventOperation::Remove);
        assert_eq!(event.user_id, UserId(1));
        assert!(store.get_review(review_id).await.unwrap().is_none());
        assert_eq!(store.tally(review_id).await.unwrap(), VoteTally::default());
    }

    #[tokio::test]
    async fn test_handle_set_vote_adjusts_score_and_records_voter() {
        // Arrange
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;

        // Act
        let events = handle_set_vote(&vote(review_id, 5, false), &FixedClock::default(), &store, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(store.useful(review_id), -1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, UserId(5));
        assert_eq!(events[0].entity_id, review_id.get());
        assert_eq!(events[0].operation, EventOperation::Add);
    }

    #[tokio::test]
    async fn test_handle_set_vote_twice_is_conflict_and_keeps_score() {
        // Arrange
        let clock = FixedClock::default();
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;
        handle_set_vote(&vote(review_id, 5, true), &clock, &store, &store)
            .await
            .unwrap();

        // Act
        let result = handle_set_vote(&vote(review_id, 5, true), &clock, &store, &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(store.useful(review_id), 1);
    }

    #[tokio::test]
    async fn test_handle_set_vote_on_unknown_review_is_not_found() {
        // Arrange
        let store = MockReviewStore::default();

        // Act
        let result =
            handle_set_vote(&vote(ReviewId(9), 5, true), &FixedClock::default(), &store, &store)
                .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::NotFound {
                kind: EntityKind::Review,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_handle_remove_vote_without_vote_is_not_found() {
        // Arrange
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;

        // Act
        let result = handle_remove_vote(&unvote(review_id, 5), &FixedClock::default(), &store, &store)
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::NotFound {
                kind: EntityKind::Vote,
                ..
            })
        ));
        assert_eq!(store.useful(review_id), 0);
    }

    #[tokio::test]
    async fn test_vote_toggle_sequence_keeps_score_equal_to_tally() {
        // Arrange
        let clock = FixedClock::default();
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;

        // Act / Assert
        handle_set_vote(&vote(review_id, 2, true), &clock, &store, &store)
            .await
            .unwrap();
        assert_eq!(store.useful(review_id), 1);

        handle_set_vote(&vote(review_id, 2, false), &clock, &store, &store)
            .await
            .unwrap();
        assert_eq!(store.useful(review_id), -1);

        handle_set_vote(&vote(review_id, 3, false), &clock, &store, &store)
            .await
            .unwrap();
        assert_eq!(store.useful(review_id), -2);

        handle_remove_vote(&unvote(review_id, 2), &clock, &store, &store)
            .await
            .unwrap();
        assert_eq!(store.useful(review_id), -1);

        handle_set_vote(&vote(review_id, 3, true), &clock, &store, &store)
            .await
            .unwrap();
        assert_eq!(store.useful(review_id), 1);

        let tally = store.tally(review_id).await.unwrap();
        assert_eq!(tally.useful(), store.useful(review_id));
        let operations: Vec<EventOperation> = store
            .committed()
            .iter()
            .skip(1)
            .map(|e| e.operation)
            .collect();
        assert_eq!(
            operations,
            vec![
                EventOperation::Add,
                EventOperation::Update,
                EventOperation::Add,
                EventOperation::Remove,
                EventOperation::Update,
            ]
        );
    }

    #[tokio::test]
    async fn test_handle_set_vote_retries_after_concurrency_conflict() {
        // Arrange
        let store = MockReviewStore::with_conflicts(2);
        let review_id = seeded_review(&store).await;

        // Act
        let events = handle_set_vote(&vote(review_id, 5, true), &FixedClock::default(), &store, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(events.len(), 1);
        assert_eq!(store.useful(review_id), 1);
    }

    #[tokio::test]
    async fn test_handle_set_vote_surfaces_conflict_when_retries_exhausted() {
        // Arrange
        let store = MockReviewStore::with_conflicts(10);
        let review_id = seeded_review(&store).await;

        // Act
        let result =
            handle_set_vote(&vote(review_id, 5, true), &FixedClock::default(), &store, &store)
                .await;

        // Assert
        assert!(matches!(result, Err(DomainError::ConcurrencyConflict(_))));
        assert_eq!(store.useful(review_id), 0);
    }

    #[tokio::test]
    async fn test_handle_reconcile_review_score_repairs_drift() {
        // Arrange
        let clock = FixedClock::default();
        let store = MockReviewStore::default();
        let review_id = seeded_review(&store).await;
        handle_set_vote(&vote(review_id, 2, true), &clock, &store, &store)
            .await
            .unwrap();
        store.corrupt_useful(review_id, 40);

        // Act
        let outcome = handle_reconcile_review_score(review_id, &store, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(
            outcome,
            ScoreReconciliation {
                cached: 40,
                recomputed: 1
            }
        );
        assert_eq!(store.useful(review_id), 1);
    }
}
