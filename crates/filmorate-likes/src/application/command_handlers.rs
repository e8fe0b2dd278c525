//! Command handlers for the Likes context.

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::command::Command;
use filmorate_core::error::DomainError;
use filmorate_core::event::FeedEvent;
use filmorate_core::retry::retry_on_conflict;

use crate::domain::aggregates::FilmLike;
use crate::domain::commands::{AddLike, RemoveLike};
use crate::domain::repository::LikeRepository;

async fn commit(
    like: &mut FilmLike,
    repo: &dyn LikeRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    let events = like.take_uncommitted_events();
    let key = like.key();
    repo.commit_like(key.film_id, key.user_id, like.loaded(), like.liked(), &events)
        .await
}

/// Handles the `AddLike` command.
///
/// # Errors
///
/// Returns `DomainError::Conflict` if the user already likes the film, or
/// the repository's error if committing fails.
pub async fn handle_add_like(
    command: &AddLike,
    clock: &dyn Clock,
    repo: &dyn LikeRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = repo.has_like(command.film_id, command.user_id).await?;
        let mut like = FilmLike::load(command.film_id, command.user_id, loaded);
        like.add(command.correlation_id, clock)?;
        commit(&mut like, repo).await
    })
    .await
}

/// Handles the `RemoveLike` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the user does not like the film, or
/// the repository's error if committing fails.
pub async fn handle_remove_like(
    command: &RemoveLike,
    clock: &dyn Clock,
    repo: &dyn LikeRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    retry_on_conflict(command.command_type(), move || async move {
        let loaded = repo.has_like(command.film_id, command.user_id).await?;
        let mut like = FilmLike::load(command.film_id, command.user_id, loaded);
        like.remove(command.correlation_id, clock)?;
        commit(&mut like, repo).await
    })
    .await
}
