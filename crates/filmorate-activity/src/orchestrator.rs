//! Composition root of the social core.
//!
//! Each operation checks that the users, films and reviews it references
//! exist, then delegates to the owning context's handler. Handlers commit
//! state and feed events together, so a failed check or a failed commit
//! leaves the feed untouched.

use std::sync::Arc;

use filmorate_core::clock::Clock;
use filmorate_core::directory::{Directory, ensure_film, ensure_user};
use filmorate_core::error::DomainError;
use filmorate_core::event::FeedEvent;
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use filmorate_core::repository::FeedRepository;
use filmorate_friendship::application::query_handlers::FriendView;
use filmorate_friendship::application::{
    command_handlers as friendship, query_handlers as friends,
};
use filmorate_friendship::domain::commands::{RemoveFriend, RequestFriend};
use filmorate_friendship::domain::repository::FriendshipRepository;
use filmorate_likes::application::command_handlers as likes;
use filmorate_likes::application::query_handlers::{RecommendationView, recommend_films};
use filmorate_likes::domain::commands::{AddLike, RemoveLike};
use filmorate_likes::domain::repository::LikeRepository;
use filmorate_reviews::application::command_handlers as reviews;
use filmorate_reviews::application::query_handlers::{self as review_queries, ReviewScoreView};
use filmorate_reviews::domain::aggregates::Review;
use filmorate_reviews::domain::commands::{
    CreateReview, DeleteReview, RemoveVote, SetVote, UpdateReview,
};
use filmorate_reviews::domain::repository::{
    ReviewRepository, ScoreReconciliation, VoteRepository,
};

use crate::feed::{self, AppendEvent};

/// The storage collaborators the orchestrator works against.
#[derive(Clone)]
pub struct Stores {
    /// User and film catalog.
    pub directory: Arc<dyn Directory>,
    /// Friendship edges.
    pub friendships: Arc<dyn FriendshipRepository>,
    /// Film likes.
    pub likes: Arc<dyn LikeRepository>,
    /// Review records.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Review votes and cached scores.
    pub votes: Arc<dyn VoteRepository>,
    /// The event log.
    pub feed: Arc<dyn FeedRepository>,
}

/// Sequences existence checks, domain commands and queries across the
/// friendship, likes, reviews and feed components.
#[derive(Clone)]
pub struct ActivityOrchestrator {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ActivityOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityOrchestrator").finish_non_exhaustive()
    }
}

impl ActivityOrchestrator {
    /// Creates an orchestrator over `stores`, stamping events with `clock`.
    #[must_use]
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    async fn ensure_users(&self, users: &[UserId]) -> Result<(), DomainError> {
        for user_id in users {
            ensure_user(self.stores.directory.as_ref(), *user_id).await?;
        }
        Ok(())
    }

    // --- friendship ---

    /// Sends or accepts a friend request.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, plus the errors of
    /// `handle_request_friend`.
    pub async fn request_friend(
        &self,
        command: &RequestFriend,
    ) -> Result<Vec<FeedEvent>, DomainError> {
        self.ensure_users(&[command.owner_id, command.target_id])
            .await?;
        friendship::handle_request_friend(
            command,
            self.clock.as_ref(),
            self.stores.friendships.as_ref(),
        )
        .await
    }

    /// Removes the owner's edge towards the target.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, plus the errors of
    /// `handle_remove_friend`.
    pub async fn remove_friend(
        &self,
        command: &RemoveFriend,
    ) -> Result<Vec<FeedEvent>, DomainError> {
        self.ensure_users(&[command.owner_id, command.target_id])
            .await?;
        friendship::handle_remove_friend(
            command,
            self.clock.as_ref(),
            self.stores.friendships.as_ref(),
        )
        .await
    }

    /// Lists a user's outgoing edges.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub async fn friends(&self, user_id: UserId) -> Result<Vec<FriendView>, DomainError> {
        self.ensure_users(&[user_id]).await?;
        friends::list_friends(user_id, self.stores.friendships.as_ref()).await
    }

    /// Lists users both users hold an edge to.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub async fn common_friends(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> Result<Vec<UserId>, DomainError> {
        self.ensure_users(&[user_id, other_id]).await?;
        friends::list_common_friends(user_id, other_id, self.stores.friendships.as_ref()).await
    }

    // --- likes ---

    /// Records a film like.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown film or user, `Conflict` for a duplicate.
    pub async fn add_like(&self, command: &AddLike) -> Result<Vec<FeedEvent>, DomainError> {
        ensure_film(self.stores.directory.as_ref(), command.film_id).await?;
        self.ensure_users(&[command.user_id]).await?;
        likes::handle_add_like(command, self.clock.as_ref(), self.stores.likes.as_ref()).await
    }

    /// Withdraws a film like.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown film, user or like.
    pub async fn remove_like(&self, command: &RemoveLike) -> Result<Vec<FeedEvent>, DomainError> {
        ensure_film(self.stores.directory.as_ref(), command.film_id).await?;
        self.ensure_users(&[command.user_id]).await?;
        likes::handle_remove_like(command, self.clock.as_ref(), self.stores.likes.as_ref()).await
    }

    /// Recommends films from the user's most similar neighbour.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub async fn recommend(&self, user_id: UserId) -> Result<RecommendationView, DomainError> {
        self.ensure_users(&[user_id]).await?;
        recommend_films(user_id, self.stores.likes.as_ref()).await
    }

    // --- reviews ---

    /// Publishes a review.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user or film, `InvalidArgument` for blank
    /// content.
    pub async fn create_review(
        &self,
        command: &CreateReview,
    ) -> Result<(Review, FeedEvent), DomainError> {
        self.ensure_users(&[command.user_id]).await?;
        ensure_film(self.stores.directory.as_ref(), command.film_id).await?;
        reviews::handle_create_review(command, self.clock.as_ref(), self.stores.reviews.as_ref())
            .await
    }

    /// Edits a review's text and polarity.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review, `InvalidArgument` for blank content.
    pub async fn update_review(
        &self,
        command: &UpdateReview,
    ) -> Result<(Review, FeedEvent), DomainError> {
        reviews::handle_update_review(command, self.clock.as_ref(), self.stores.reviews.as_ref())
            .await
    }

    /// Deletes a review with its votes.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn delete_review(&self, command: &DeleteReview) -> Result<FeedEvent, DomainError> {
        reviews::handle_delete_review(command, self.clock.as_ref(), self.stores.reviews.as_ref())
            .await
    }

    /// Loads one review.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn review(&self, review_id: ReviewId) -> Result<Review, DomainError> {
        review_queries::get_review(review_id, self.stores.reviews.as_ref()).await
    }

    /// Lists the most useful reviews, optionally for one film.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown film, `InvalidArgument` for a non-positive
    /// count.
    pub async fn reviews(
        &self,
        film_id: Option<FilmId>,
        count: Option<i64>,
    ) -> Result<Vec<Review>, DomainError> {
        if let Some(film_id) = film_id {
            ensure_film(self.stores.directory.as_ref(), film_id).await?;
        }
        review_queries::list_reviews(film_id, count, self.stores.reviews.as_ref()).await
    }

    // --- votes ---

    /// Casts or flips a usefulness vote.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user or review, `Conflict` for a repeated
    /// vote.
    pub async fn set_vote(&self, command: &SetVote) -> Result<Vec<FeedEvent>, DomainError> {
        self.ensure_users(&[command.user_id]).await?;
        reviews::handle_set_vote(
            command,
            self.clock.as_ref(),
            self.stores.reviews.as_ref(),
            self.stores.votes.as_ref(),
        )
        .await
    }

    /// Withdraws a usefulness vote.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, review or vote.
    pub async fn remove_vote(&self, command: &RemoveVote) -> Result<Vec<FeedEvent>, DomainError> {
        self.ensure_users(&[command.user_id]).await?;
        reviews::handle_remove_vote(
            command,
            self.clock.as_ref(),
            self.stores.reviews.as_ref(),
            self.stores.votes.as_ref(),
        )
        .await
    }

    /// Reports the cached score next to a fresh tally.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn review_score(&self, review_id: ReviewId) -> Result<ReviewScoreView, DomainError> {
        review_queries::get_review_score(
            review_id,
            self.stores.reviews.as_ref(),
            self.stores.votes.as_ref(),
        )
        .await
    }

    /// Recomputes and stores a review's score from its votes.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn reconcile_review_score(
        &self,
        review_id: ReviewId,
    ) -> Result<ScoreReconciliation, DomainError> {
        reviews::handle_reconcile_review_score(
            review_id,
            self.stores.reviews.as_ref(),
            self.stores.votes.as_ref(),
        )
        .await
    }

    // --- feed ---

    /// Records an event directly in a user's feed.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user, `Internal` if storage fails.
    pub async fn append_event(&self, command: &AppendEvent) -> Result<FeedEvent, DomainError> {
        self.ensure_users(&[command.user_id]).await?;
        feed::handle_append_event(command, self.clock.as_ref(), self.stores.feed.as_ref()).await
    }

    /// Loads a user's feed, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown user.
    pub async fn feed(&self, user_id: UserId) -> Result<Vec<FeedEvent>, DomainError> {
        self.ensure_users(&[user_id]).await?;
        feed::load_feed(user_id, self.stores.feed.as_ref()).await
    }
}
