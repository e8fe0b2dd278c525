//! `FeedRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{EventId, UserId};
use filmorate_core::repository::FeedRepository;

/// A feed repository that keeps every appended event in memory and assigns
/// sequential event ids starting at 1.
#[derive(Debug, Default)]
pub struct RecordingFeedRepository {
    events: Mutex<Vec<FeedEvent>>,
}

impl RecordingFeedRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events in append order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded(&self) -> Vec<FeedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedRepository for RecordingFeedRepository {
    async fn append(&self, event: NewEvent) -> Result<FeedEvent, DomainError> {
        let mut events = self.events.lock().unwrap();
        #[allow(clippy::cast_possible_wrap)]
        let event_id = EventId(events.len() as i64 + 1);
        let recorded = event.into_recorded(event_id);
        events.push(recorded.clone());
        Ok(recorded)
    }

    async fn load_feed(&self, user_id: UserId) -> Result<Vec<FeedEvent>, DomainError> {
        let mut feed: Vec<FeedEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        feed.sort_by_key(FeedEvent::feed_order);
        Ok(feed)
    }
}

/// A feed repository that always returns an internal error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingFeedRepository;

#[async_trait]
impl FeedRepository for FailingFeedRepository {
    async fn append(&self, _event: NewEvent) -> Result<FeedEvent, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }

    async fn load_feed(&self, _user_id: UserId) -> Result<Vec<FeedEvent>, DomainError> {
        Err(DomainError::Internal("connection refused".into()))
    }
}
