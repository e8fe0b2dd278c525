//! Event log repository abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::{FeedEvent, NewEvent};
use crate::ids::UserId;

/// Append-only store of user activity events.
///
/// Aggregate repositories record their events in the same atomic unit as the
/// state change; this trait covers the log itself.
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Records one event and returns it with its assigned identity.
    async fn append(&self, event: NewEvent) -> Result<FeedEvent, DomainError>;

    /// Loads every event in a user's feed ordered by timestamp ascending,
    /// ties broken by event id.
    async fn load_feed(&self, user_id: UserId) -> Result<Vec<FeedEvent>, DomainError>;
}
