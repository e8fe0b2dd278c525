//! Query handlers for the Friendship context.

use std::collections::BTreeSet;

use filmorate_core::error::DomainError;
use filmorate_core::ids::UserId;
use serde::Serialize;

use crate::domain::aggregates::FriendshipStatus;
use crate::domain::repository::FriendshipRepository;

/// Read-only view of one of a user's edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendView {
    /// The friend's identifier.
    pub user_id: UserId,
    /// Status of the edge from the listing user to this friend.
    pub status: FriendshipStatus,
}

/// Lists every user the given user holds an edge to, pending or confirmed,
/// sorted by id.
///
/// # Errors
///
/// Returns the repository's error if loading fails.
pub async fn list_friends(
    user_id: UserId,
    repo: &dyn FriendshipRepository,
) -> Result<Vec<FriendView>, DomainError> {
    let mut friends: Vec<FriendView> = repo
        .friends_of(user_id)
        .await?
        .into_iter()
        .map(|edge| FriendView {
            user_id: edge.target_id,
            status: edge.status,
        })
        .collect();
    friends.sort_by_key(|f| f.user_id);
    Ok(friends)
}

/// Lists users both `user_id` and `other_id` hold an edge to, sorted by id.
///
/// # Errors
///
/// Returns the repository's error if loading fails.
pub async fn list_common_friends(
    user_id: UserId,
    other_id: UserId,
    repo: &dyn FriendshipRepository,
) -> Result<Vec<UserId>, DomainError> {
    let mine: BTreeSet<UserId> = repo
        .friends_of(user_id)
        .await?
        .into_iter()
        .map(|e| e.target_id)
        .collect();
    let theirs: BTreeSet<UserId> = repo
        .friends_of(other_id)
        .await?
        .into_iter()
        .map(|e| e.target_id)
        .collect();
    Ok(mine.intersection(&theirs).copied().collect())
}
