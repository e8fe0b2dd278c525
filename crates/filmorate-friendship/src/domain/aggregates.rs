//! Aggregate roots for the Friendship context.

use std::fmt;
use std::str::FromStr;

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::error::DomainError;
use filmorate_core::event::{EventOperation, EventType, NewEvent};
use filmorate_core::ids::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a directed friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    /// The owner asked; the counterpart has not reciprocated.
    Pending,
    /// Both users hold an edge towards each other.
    Confirmed,
}

impl FriendshipStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
        }
    }
}

impl FromStr for FriendshipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            other => Err(DomainError::Internal(format!(
                "unknown friendship status: {other}"
            ))),
        }
    }
}

/// Both directed edges between two users, seen from the owner's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeState {
    /// Edge owner -> target, if present.
    pub forward: Option<FriendshipStatus>,
    /// Edge target -> owner, if present.
    pub reverse: Option<FriendshipStatus>,
}

impl EdgeState {
    /// Both edges confirmed.
    pub const MUTUAL: Self = Self {
        forward: Some(FriendshipStatus::Confirmed),
        reverse: Some(FriendshipStatus::Confirmed),
    };

    /// The same pair seen from the target's side.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            forward: self.reverse,
            reverse: self.forward,
        }
    }
}

/// Key of an edge pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairKey {
    /// The acting user.
    pub owner_id: UserId,
    /// The counterpart.
    pub target_id: UserId,
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "friendship {}->{}", self.owner_id, self.target_id)
    }
}

/// The aggregate root for the pair of edges between two users.
///
/// Transitions per edge:
/// absent -> PENDING (request, no reverse edge);
/// absent | PENDING -> CONFIRMED (request while the reverse edge exists,
/// which confirms the reverse edge too);
/// CONFIRMED -> PENDING (counterpart removes their edge);
/// any -> absent (owner removes).
#[derive(Debug)]
pub struct FriendshipPair {
    key: PairKey,
    loaded: EdgeState,
    state: EdgeState,
    uncommitted_events: Vec<NewEvent>,
}

impl FriendshipPair {
    /// Wraps a loaded edge pair.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if both ids are the same user.
    pub fn load(
        owner_id: UserId,
        target_id: UserId,
        loaded: EdgeState,
    ) -> Result<Self, DomainError> {
        if owner_id == target_id {
            return Err(DomainError::InvalidArgument(format!(
                "user {owner_id} cannot befriend themselves"
            )));
        }
        Ok(Self {
            key: PairKey {
                owner_id,
                target_id,
            },
            loaded,
            state: loaded,
            uncommitted_events: Vec::new(),
        })
    }

    /// The acting user.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.key.owner_id
    }

    /// The counterpart.
    #[must_use]
    pub fn target_id(&self) -> UserId {
        self.key.target_id
    }

    /// The state the pair was loaded with.
    #[must_use]
    pub fn loaded(&self) -> EdgeState {
        self.loaded
    }

    /// The current (possibly uncommitted) state.
    #[must_use]
    pub fn state(&self) -> EdgeState {
        self.state
    }

    /// Requests friendship from owner to target, confirming both edges when
    /// the target has already reached out. Re-requesting a pending edge is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the owner's edge is already
    /// confirmed.
    pub fn request(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.state.forward == Some(FriendshipStatus::Confirmed) {
            return Err(DomainError::Conflict(format!(
                "user {} is already a friend of user {}",
                self.key.target_id, self.key.owner_id
            )));
        }

        if self.state.reverse.is_some() {
            self.state = EdgeState::MUTUAL;
        } else if self.state.forward == Some(FriendshipStatus::Pending) {
            return Ok(());
        } else {
            self.state.forward = Some(FriendshipStatus::Pending);
        }

        self.record(EventOperation::Add, correlation_id, clock);
        Ok(())
    }

    /// Removes the owner's edge. A confirmed reverse edge falls back to
    /// pending. Removing an absent edge is a no-op.
    pub fn remove(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        if self.state.forward.is_none() {
            return;
        }

        self.state.forward = None;
        if self.state.reverse == Some(FriendshipStatus::Confirmed) {
            self.state.reverse = Some(FriendshipStatus::Pending);
        }

        self.record(EventOperation::Remove, correlation_id, clock);
    }

    fn record(&mut self, operation: EventOperation, correlation_id: Uuid, clock: &dyn Clock) {
        self.uncommitted_events.push(NewEvent::new(
            self.key.owner_id,
            EventType::Friend,
            operation,
            self.key.target_id.get(),
            correlation_id,
            clock,
        ));
    }
}

impl AggregateRoot for FriendshipPair {
    type Key = PairKey;

    fn key(&self) -> PairKey {
        self.key
    }

    fn is_dirty(&self) -> bool {
        self.state != self.loaded
    }

    fn uncommitted_events(&self) -> &[NewEvent] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<NewEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
