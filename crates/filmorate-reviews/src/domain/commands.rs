//! Commands for the Reviews context.

use filmorate_core::command::Command;
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use uuid::Uuid;

/// Command to publish a new review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Review text.
    pub content: String,
    /// Whether the review recommends the film.
    pub is_positive: bool,
    /// The author.
    pub user_id: UserId,
    /// The reviewed film.
    pub film_id: FilmId,
}

impl Command for CreateReview {
    fn command_type(&self) -> &'static str {
        "reviews.create_review"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Command to edit an existing review's text and polarity.
#[derive(Debug, Clone)]
pub struct UpdateReview {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The review to edit.
    pub review_id: ReviewId,
    /// New review text.
    pub content: String,
    /// New polarity.
    pub is_positive: bool,
}

impl Command for UpdateReview {
    fn command_type(&self) -> &'static str {
        "reviews.update_review"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        None
    }
}

/// Command to delete a review and its votes.
#[derive(Debug, Clone)]
pub struct DeleteReview {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The review to delete.
    pub review_id: ReviewId,
}

impl Command for DeleteReview {
    fn command_type(&self) -> &'static str {
        "reviews.delete_review"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        None
    }
}

/// Command to cast or flip a usefulness vote.
#[derive(Debug, Clone)]
pub struct SetVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The review voted on.
    pub review_id: ReviewId,
    /// The voter.
    pub user_id: UserId,
    /// Positive (useful) or negative vote.
    pub is_positive: bool,
}

impl Command for SetVote {
    fn command_type(&self) -> &'static str {
        "reviews.set_vote"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Command to withdraw a usefulness vote.
#[derive(Debug, Clone)]
pub struct RemoveVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The review voted on.
    pub review_id: ReviewId,
    /// The voter.
    pub user_id: UserId,
}

impl Command for RemoveVote {
    fn command_type(&self) -> &'static str {
        "reviews.remove_vote"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}
