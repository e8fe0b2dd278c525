//! In-memory like relation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{FilmId, UserId};
use filmorate_likes::domain::repository::LikeRepository;

use super::feed::MemoryFeed;
use super::shard::Sharded;

use crate::stale_commit;

/// Likers of each film, striped by film.
#[derive(Debug)]
pub struct MemoryLikes {
    likers: Sharded<HashMap<FilmId, BTreeSet<UserId>>>,
    feed: Arc<MemoryFeed>,
}

impl MemoryLikes {
    /// Creates an empty like relation that records events into `feed`.
    #[must_use]
    pub fn new(feed: Arc<MemoryFeed>) -> Self {
        Self {
            likers: Sharded::new("likes"),
            feed,
        }
    }
}

#[async_trait]
impl LikeRepository for MemoryLikes {
    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> Result<bool, DomainError> {
        let likers = self.likers.lock(&film_id)?;
        Ok(likers.get(&film_id).is_some_and(|users| users.contains(&user_id)))
    }

    async fn commit_like(
        &self,
        film_id: FilmId,
        user_id: UserId,
        expected: bool,
        next: bool,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let mut likers = self.likers.lock(&film_id)?;
        let users = likers.entry(film_id).or_default();
        if users.contains(&user_id) != expected {
            return Err(stale_commit(format!(
                "film {film_id} by user {user_id}"
            )));
        }
        let recorded = self.feed.record(events)?;
        if next {
            users.insert(user_id);
        } else {
            users.remove(&user_id);
        }
        Ok(recorded)
    }

    async fn liked_films(&self, user_id: UserId) -> Result<BTreeSet<FilmId>, DomainError> {
        let mut films = BTreeSet::new();
        self.likers.scan(|likers| {
            films.extend(
                likers
                    .iter()
                    .filter(|(_, users)| users.contains(&user_id))
                    .map(|(film_id, _)| *film_id),
            );
        })?;
        Ok(films)
    }

    async fn users_who_liked(&self, film_id: FilmId) -> Result<BTreeSet<UserId>, DomainError> {
        let likers = self.likers.lock(&film_id)?;
        Ok(likers.get(&film_id).cloned().unwrap_or_default())
    }
}
