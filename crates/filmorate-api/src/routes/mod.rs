//! Route modules organized by bounded context.

use filmorate_core::event::FeedEvent;
use filmorate_core::ids::EventId;
use serde::Serialize;

pub mod feed;
pub mod friends;
pub mod health;
pub mod likes;
pub mod recommendations;
pub mod reviews;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the feed events the command produced.
    pub event_ids: Vec<EventId>,
}

impl CommandResponse {
    pub(crate) fn from_events(events: &[FeedEvent]) -> Self {
        Self {
            event_ids: events.iter().map(|e| e.event_id).collect(),
        }
    }
}
