//! In-memory event log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::{EventId, UserId};
use filmorate_core::repository::FeedRepository;

use super::shard::Sharded;

/// Per-user event logs striped by user. Event ids come from one global
/// counter so they increase across all feeds.
#[derive(Debug)]
pub struct MemoryFeed {
    logs: Sharded<HashMap<UserId, Vec<FeedEvent>>>,
    next_event_id: AtomicI64,
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFeed {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: Sharded::new("feed"),
            next_event_id: AtomicI64::new(1),
        }
    }

    /// Appends events on behalf of an aggregate store. Callers hold their
    /// own stripe lock. Every feed stripe the events touch is locked before
    /// the first push, so a poisoned stripe leaves the log unchanged.
    pub(crate) fn record(&self, events: &[NewEvent]) -> Result<Vec<FeedEvent>, DomainError> {
        let mut stripes = self.logs.lock_many(events.iter().map(|e| &e.user_id))?;
        let mut recorded = Vec::with_capacity(events.len());
        for event in events.iter().cloned() {
            let logs = stripes
                .get_mut(&event.user_id)
                .ok_or_else(|| DomainError::Internal("feed stripe not held".to_string()))?;
            recorded.push(self.push(logs, event));
        }
        Ok(recorded)
    }

    fn push(&self, logs: &mut HashMap<UserId, Vec<FeedEvent>>, event: NewEvent) -> FeedEvent {
        let event_id = EventId(self.next_event_id.fetch_add(1, Ordering::SeqCst));
        let recorded = event.into_recorded(event_id);
        logs.entry(recorded.user_id)
            .or_default()
            .push(recorded.clone());
        recorded
    }
}

#[async_trait]
impl FeedRepository for MemoryFeed {
    async fn append(&self, event: NewEvent) -> Result<FeedEvent, DomainError> {
        let mut logs = self.logs.lock(&event.user_id)?;
        Ok(self.push(&mut logs, event))
    }

    async fn load_feed(&self, user_id: UserId) -> Result<Vec<FeedEvent>, DomainError> {
        let mut feed = self
            .logs
            .lock(&user_id)?
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        feed.sort_by_key(FeedEvent::feed_order);
        Ok(feed)
    }
}
