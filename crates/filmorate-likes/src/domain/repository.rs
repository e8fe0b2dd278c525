//! Storage abstraction for the like relation.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, UserId};

use crate::domain::recommendation::overlap_counts;

/// Repository for (film, user) like pairs.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Whether `user_id` likes `film_id`.
    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> Result<bool, DomainError>;

    /// Sets the like's presence to `next` and records `events`, atomically.
    ///
    /// Fails with `DomainError::ConcurrencyConflict` without writing if the
    /// stored presence no longer equals `expected`.
    async fn commit_like(
        &self,
        film_id: FilmId,
        user_id: UserId,
        expected: bool,
        next: bool,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError>;

    /// Films liked by a user.
    async fn liked_films(&self, user_id: UserId) -> Result<BTreeSet<FilmId>, DomainError>;

    /// Users who liked a film.
    async fn users_who_liked(&self, film_id: FilmId) -> Result<BTreeSet<UserId>, DomainError>;

    /// For every other user who shares a liked film with `user_id`, the
    /// number of films they both like. The user never appears in the map.
    ///
    /// The default walks `liked_films` and `users_who_liked`; stores that
    /// can aggregate in one round trip should override it.
    async fn co_likers(&self, user_id: UserId) -> Result<BTreeMap<UserId, usize>, DomainError> {
        let liked = self.liked_films(user_id).await?;
        let mut likers = Vec::with_capacity(liked.len());
        for film_id in liked {
            likers.push(self.users_who_liked(film_id).await?);
        }
        Ok(overlap_counts(user_id, &likers))
    }
}
