//! Feed event types.
//!
//! Every state change in the social core is recorded as exactly one event in
//! the acting user's feed. Aggregates produce `NewEvent`s; the event log
//! assigns identity and returns `FeedEvent`s.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::DomainError;
use crate::ids::{EventId, UserId};

/// What kind of entity an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A film like.
    Like,
    /// A friendship edge.
    Friend,
    /// A review or a vote on a review.
    Review,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventOperation {
    /// The entity was created.
    Add,
    /// The entity was modified.
    Update,
    /// The entity was deleted.
    Remove,
}

impl EventType {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Friend => "FRIEND",
            Self::Review => "REVIEW",
        }
    }
}

impl EventOperation {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EventOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(Self::Like),
            "FRIEND" => Ok(Self::Friend),
            "REVIEW" => Ok(Self::Review),
            other => Err(DomainError::InvalidArgument(format!(
                "unknown event type: {other}"
            ))),
        }
    }
}

impl FromStr for EventOperation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Self::Add),
            "UPDATE" => Ok(Self::Update),
            "REMOVE" => Ok(Self::Remove),
            other => Err(DomainError::InvalidArgument(format!(
                "unknown event operation: {other}"
            ))),
        }
    }
}

/// An event decided by an aggregate but not yet recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// The user whose feed receives the event.
    pub user_id: UserId,
    /// Entity kind.
    pub event_type: EventType,
    /// Operation performed.
    pub operation: EventOperation,
    /// Identifier of the affected entity (friend, film or review id).
    pub entity_id: i64,
    /// Time the producing command was decided.
    pub occurred_at: DateTime<Utc>,
    /// Correlation ID of the producing command.
    pub correlation_id: Uuid,
}

impl NewEvent {
    /// Builds an event stamped with the clock's current time.
    #[must_use]
    pub fn new(
        user_id: UserId,
        event_type: EventType,
        operation: EventOperation,
        entity_id: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            user_id,
            event_type,
            operation,
            entity_id,
            occurred_at: clock.now(),
            correlation_id,
        }
    }

    /// Attaches the identity assigned by the event log.
    #[must_use]
    pub fn into_recorded(self, event_id: EventId) -> FeedEvent {
        FeedEvent {
            event_id,
            timestamp: self.occurred_at,
            user_id: self.user_id,
            event_type: self.event_type,
            operation: self.operation,
            entity_id: self.entity_id,
            correlation_id: self.correlation_id,
        }
    }
}

/// An immutable, recorded feed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    /// Unique, increasing event identifier.
    pub event_id: EventId,
    /// When the event happened (epoch milliseconds on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// The user whose feed holds the event.
    pub user_id: UserId,
    /// Entity kind.
    pub event_type: EventType,
    /// Operation performed.
    pub operation: EventOperation,
    /// Identifier of the affected entity.
    pub entity_id: i64,
    /// Correlation ID of the command that produced the event.
    pub correlation_id: Uuid,
}

impl FeedEvent {
    /// Sort key for feed order: timestamp ascending, then event id.
    #[must_use]
    pub fn feed_order(&self) -> (DateTime<Utc>, EventId) {
        (self.timestamp, self.event_id)
    }
}
