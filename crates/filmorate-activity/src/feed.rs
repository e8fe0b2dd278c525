//! The user activity feed.

use filmorate_core::clock::Clock;
use filmorate_core::command::Command;
use filmorate_core::error::DomainError;
use filmorate_core::event::{EventOperation, EventType, FeedEvent, NewEvent};
use filmorate_core::ids::UserId;
use filmorate_core::repository::FeedRepository;
use tracing::info;
use uuid::Uuid;

/// Command to record an event directly in a user's feed.
#[derive(Debug, Clone)]
pub struct AppendEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Whose feed the event belongs to.
    pub user_id: UserId,
    /// What kind of entity the event is about.
    pub event_type: EventType,
    /// What happened to it.
    pub operation: EventOperation,
    /// The entity's identifier.
    pub entity_id: i64,
}

impl Command for AppendEvent {
    fn command_type(&self) -> &'static str {
        "activity.append_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Handles the `AppendEvent` command, stamping the event with the clock.
///
/// # Errors
///
/// Returns the repository's error if the append fails.
pub async fn handle_append_event(
    command: &AppendEvent,
    clock: &dyn Clock,
    repo: &dyn FeedRepository,
) -> Result<FeedEvent, DomainError> {
    let event = NewEvent::new(
        command.user_id,
        command.event_type,
        command.operation,
        command.entity_id,
        command.correlation_id,
        clock,
    );
    let recorded = repo.append(event).await?;
    info!(
        event_id = %recorded.event_id,
        user_id = %recorded.user_id,
        command = command.command_type(),
        "event appended"
    );
    Ok(recorded)
}

/// Loads a user's feed, oldest first.
///
/// # Errors
///
/// Returns the repository's error if loading fails.
pub async fn load_feed(
    user_id: UserId,
    repo: &dyn FeedRepository,
) -> Result<Vec<FeedEvent>, DomainError> {
    repo.load_feed(user_id).await
}
