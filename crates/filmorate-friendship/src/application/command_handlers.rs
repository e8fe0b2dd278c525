//! Command handlers for the Friendship context.
//!
//! Each handler loads the edge pair, lets the aggregate decide the
//! transition, and commits the new pair together with its feed events.
//! A commit that loses a race is retried against fresh state.

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::command::Command;
use filmorate_core::error::DomainError;
use filmorate_core::event::FeedEvent;
use filmorate_core::retry::retry_on_conflict;
use tracing::debug;

use crate::domain::aggregates::FriendshipPair;
use crate::domain::commands::{RemoveFriend, RequestFriend};
use crate::domain::repository::FriendshipRepository;

async fn commit(
    pair: &mut FriendshipPair,
    repo: &dyn FriendshipRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    if !pair.is_dirty() {
        debug!(pair = %pair.key(), "friendship unchanged, nothing to commit");
        return Ok(Vec::new());
    }
    let events = pair.take_uncommitted_events();
    repo.commit_pair(
        pair.owner_id(),
        pair.target_id(),
        pair.loaded(),
        pair.state(),
        &events,
    )
    .await
}

/// Handles the `RequestFriend` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for a self-request,
/// `DomainError::Conflict` if the users are already friends, or the
/// repository's error if loading or committing fails.
pub async fn handle_request_friend(
    command: &RequestFriend,
    clock: &dyn Clock,
    repo: &dyn FriendshipRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = repo.load_pair(command.owner_id, command.target_id).await?;
        let mut pair = FriendshipPair::load(command.owner_id, command.target_id, loaded)?;
        pair.request(command.correlation_id, clock)?;
        commit(&mut pair, repo).await
    })
    .await
}

/// Handles the `RemoveFriend` command. Removing an absent edge succeeds
/// without producing events.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for a self-removal, or the
/// repository's error if loading or committing fails.
pub async fn handle_remove_friend(
    command: &RemoveFriend,
    clock: &dyn Clock,
    repo: &dyn FriendshipRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = repo.load_pair(command.owner_id, command.target_id).await?;
        let mut pair = FriendshipPair::load(command.owner_id, command.target_id, loaded)?;
        pair.remove(command.correlation_id, clock);
        commit(&mut pair, repo).await
    })
    .await
}
