//! Commands for the Likes context.

use filmorate_core::command::Command;
use filmorate_core::ids::{FilmId, UserId};
use uuid::Uuid;

/// Command to like a film.
#[derive(Debug, Clone)]
pub struct AddLike {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The film being liked.
    pub film_id: FilmId,
    /// The user liking it.
    pub user_id: UserId,
}

impl Command for AddLike {
    fn command_type(&self) -> &'static str {
        "likes.add_like"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Command to withdraw a like.
#[derive(Debug, Clone)]
pub struct RemoveLike {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The film that was liked.
    pub film_id: FilmId,
    /// The user withdrawing the like.
    pub user_id: UserId,
}

impl Command for RemoveLike {
    fn command_type(&self) -> &'static str {
        "likes.remove_like"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}
