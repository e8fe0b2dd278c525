//! Query handlers for the Reviews context.

use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::ids::{FilmId, ReviewId};
use serde::Serialize;

use crate::domain::aggregates::Review;
use crate::domain::repository::{ReviewRepository, VoteRepository};

/// Number of reviews listed when the caller gives no count.
pub const DEFAULT_REVIEW_COUNT: i64 = 10;

/// A review's cached score next to the score its votes imply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewScoreView {
    /// The review.
    pub review_id: ReviewId,
    /// Cached score.
    pub useful: i64,
    /// Score recomputed from the vote rows.
    pub recomputed: i64,
    /// Number of positive votes.
    pub positive_votes: i64,
    /// Number of negative votes.
    pub negative_votes: i64,
    /// Whether the cached score matches the votes.
    pub consistent: bool,
}

/// Loads one review.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist.
pub async fn get_review(
    review_id: ReviewId,
    repo: &dyn ReviewRepository,
) -> Result<Review, DomainError> {
    repo.get_review(review_id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Review, review_id))
}

/// Lists the most useful reviews, optionally for one film.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if `count` is not positive.
pub async fn list_reviews(
    film_id: Option<FilmId>,
    count: Option<i64>,
    repo: &dyn ReviewRepository,
) -> Result<Vec<Review>, DomainError> {
    let count = count.unwrap_or(DEFAULT_REVIEW_COUNT);
    let limit = usize::try_from(count)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            DomainError::InvalidArgument(format!("count must be positive, got {count}"))
        })?;
    repo.list_reviews(film_id, limit).await
}

/// Reports the cached score alongside a fresh tally of the votes.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the review does not exist.
pub async fn get_review_score(
    review_id: ReviewId,
    reviews: &dyn ReviewRepository,
    votes: &dyn VoteRepository,
) -> Result<ReviewScoreView, DomainError> {
    let review = get_review(review_id, reviews).await?;
    let tally = votes.tally(review_id).await?;
    Ok(ReviewScoreView {
        review_id,
        useful: review.useful,
        recomputed: tally.useful(),
        positive_votes: tally.positive,
        negative_votes: tally.negative,
        consistent: review.useful == tally.useful(),
    })
}

#[cfg(test)]
mod tests {
    use filmorate_core::error::DomainError;
    use filmorate_core::ids::{FilmId, ReviewId, UserId};
    use filmorate_test_support::FixedClock;
    use uuid::Uuid;

    use super::{get_review, get_review_score, list_reviews};
    use crate::application::command_handlers::tests::{MockReviewStore, create};
    use crate::application::command_handlers::{handle_create_review, handle_set_vote};
    use crate::domain::commands::SetVote;

    async fn review(store: &MockReviewStore, film: i64) -> ReviewId {
        handle_create_review(&create(1, film, "worth it"), &FixedClock::default(), store)
            .await
            .unwrap()
            .0
            .review_id
    }

    async fn vote(store: &MockReviewStore, review_id: ReviewId, user: i64, is_positive: bool) {
        let command = SetVote {
            correlation_id: Uuid::new_v4(),
            review_id,
            user_id: UserId(user),
            is_positive,
        };
        handle_set_vote(&command, &FixedClock::default(), store, store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_reviews_orders_by_useful_then_id() {
        // Arrange
        let store = MockReviewStore::default();
        let first = review(&store, 1).await;
        let second = review(&store, 1).await;
        let third = review(&store, 1).await;
        vote(&store, third, 5, true).await;
        vote(&store, first, 5, false).await;

        // Act
        let listed = list_reviews(None, None, &store).await.unwrap();

        // Assert
        let ids: Vec<ReviewId> = listed.iter().map(|r| r.review_id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_list_reviews_filters_by_film_and_limits() {
        // Arrange
        let store = MockReviewStore::default();
        for film in [1, 2, 2, 2] {
            review(&store, film).await;
        }

        // Act
        let listed = list_reviews(Some(FilmId(2)), Some(2), &store).await.unwrap();

        // Assert
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.film_id == FilmId(2)));
    }

    #[tokio::test]
    async fn test_list_reviews_defaults_to_ten() {
        // Arrange
        let store = MockReviewStore::default();
        for _ in 0..12 {
            review(&store, 1).await;
        }

        // Act
        let listed = list_reviews(None, None, &store).await.unwrap();

        // Assert
        assert_eq!(listed.len(), 10);
    }

    #[tokio::test]
    async fn test_list_reviews_rejects_non_positive_count() {
        // Arrange
        let store = MockReviewStore::default();

        // Act
        let zero = list_reviews(None, Some(0), &store).await;
        let negative = list_reviews(None, Some(-3), &store).await;

        // Assert
        match zero {
            Err(DomainError::InvalidArgument(msg)) => {
                assert_eq!(msg, "count must be positive, got 0");
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert!(matches!(negative, Err(DomainError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_get_review_unknown_is_not_found() {
        // Arrange
        let store = MockReviewStore::default();

        // Act
        let result = get_review(ReviewId(3), &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_review_score_reports_tally_and_detects_drift() {
        // Arrange
        let store = MockReviewStore::default();
        let review_id = review(&store, 1).await;
        vote(&store, review_id, 2, true).await;
        vote(&store, review_id, 3, true).await;
        vote(&store, review_id, 4, false).await;

        // Act
        let healthy = get_review_score(review_id, &store, &store).await.unwrap();
        store.corrupt_useful(review_id, 9);
        let drifted = get_review_score(review_id, &store, &store).await.unwrap();

        // Assert
        assert_eq!(healthy.useful, 1);
        assert_eq!(healthy.positive_votes, 2);
        assert_eq!(healthy.negative_votes, 1);
        assert!(healthy.consistent);
        assert_eq!(drifted.useful, 9);
        assert_eq!(drifted.recomputed, 1);
        assert!(!drifted.consistent);
    }
}
