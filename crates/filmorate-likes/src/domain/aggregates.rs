//! Aggregate roots for the Likes context.

use std::fmt;

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::event::{EventOperation, EventType, NewEvent};
use filmorate_core::ids::{FilmId, UserId};
use uuid::Uuid;

/// Key of a like: one per film and user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LikeKey {
    /// The liked film.
    pub film_id: FilmId,
    /// The user.
    pub user_id: UserId,
}

impl fmt::Display for LikeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "film {} by user {}", self.film_id, self.user_id)
    }
}

/// The aggregate root for one user's like of one film.
#[derive(Debug)]
pub struct FilmLike {
    key: LikeKey,
    loaded: bool,
    liked: bool,
    uncommitted_events: Vec<NewEvent>,
}

impl FilmLike {
    /// Wraps the loaded presence of a like.
    #[must_use]
    pub fn load(film_id: FilmId, user_id: UserId, liked: bool) -> Self {
        Self {
            key: LikeKey { film_id, user_id },
            loaded: liked,
            liked,
            uncommitted_events: Vec::new(),
        }
    }

    /// Whether the like was present when loaded.
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the like is present now.
    #[must_use]
    pub fn liked(&self) -> bool {
        self.liked
    }

    /// Records the like.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the user already likes the film.
    pub fn add(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.liked {
            return Err(DomainError::Conflict(format!(
                "user {} already likes film {}",
                self.key.user_id, self.key.film_id
            )));
        }
        self.liked = true;
        self.record(EventOperation::Add, correlation_id, clock);
        Ok(())
    }

    /// Withdraws the like.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if there is no like to withdraw.
    pub fn remove(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.liked {
            return Err(DomainError::not_found(EntityKind::Like, self.key));
        }
        self.liked = false;
        self.record(EventOperation::Remove, correlation_id, clock);
        Ok(())
    }

    fn record(&mut self, operation: EventOperation, correlation_id: Uuid, clock: &dyn Clock) {
        self.uncommitted_events.push(NewEvent::new(
            self.key.user_id,
            EventType::Like,
            operation,
            self.key.film_id.get(),
            correlation_id,
            clock,
        ));
    }
}

impl AggregateRoot for FilmLike {
    type Key = LikeKey;

    fn key(&self) -> LikeKey {
        self.key
    }

    fn is_dirty(&self) -> bool {
        self.liked != self.loaded
    }

    fn uncommitted_events(&self) -> &[NewEvent] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<NewEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
