//! Storage abstraction for friendship edges.

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::UserId;

use super::aggregates::{EdgeState, FriendshipStatus};

/// A stored directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendEdge {
    /// The user who owns the edge.
    pub owner_id: UserId,
    /// The user the edge points at.
    pub target_id: UserId,
    /// Edge status.
    pub status: FriendshipStatus,
}

/// Repository for friendship edge pairs.
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Loads both directed edges between `owner_id` and `target_id`.
    async fn load_pair(&self, owner_id: UserId, target_id: UserId)
    -> Result<EdgeState, DomainError>;

    /// Replaces both edges with `next` and records `events`, atomically.
    ///
    /// Fails with `DomainError::ConcurrencyConflict` without writing
    /// anything if the stored pair no longer equals `expected`.
    async fn commit_pair(
        &self,
        owner_id: UserId,
        target_id: UserId,
        expected: EdgeState,
        next: EdgeState,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError>;

    /// Loads every edge owned by `owner_id`, in any status.
    async fn friends_of(&self, owner_id: UserId) -> Result<Vec<FriendEdge>, DomainError>;
}
