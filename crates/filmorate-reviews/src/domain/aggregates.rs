//! Aggregate roots for the Reviews context.

use std::fmt;

use filmorate_core::aggregate::AggregateRoot;
use filmorate_core::clock::Clock;
use filmorate_core::error::{DomainError, EntityKind};
use filmorate_core::event::{EventOperation, EventType, NewEvent};
use filmorate_core::ids::{FilmId, ReviewId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Polarity of a usefulness vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    /// The voter found the review useful.
    Positive,
    /// The voter found the review unhelpful.
    Negative,
}

impl VoteKind {
    /// Maps the wire/storage boolean to a vote kind.
    #[must_use]
    pub fn from_positive(is_positive: bool) -> Self {
        if is_positive {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Storage boolean.
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Positive => "liked",
            Self::Negative => "disliked",
        }
    }
}

/// A stored vote's contribution to the review's `useful` score.
#[must_use]
pub fn contribution(vote: Option<VoteKind>) -> i64 {
    match vote {
        Some(VoteKind::Positive) => 1,
        Some(VoteKind::Negative) => -1,
        None => 0,
    }
}

/// Key of a vote: one per review and user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteKey {
    /// The review voted on.
    pub review_id: ReviewId,
    /// The voter.
    pub user_id: UserId,
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "review {} by user {}", self.review_id, self.user_id)
    }
}

/// The change a vote commit applies: replace `expected` with `next` and
/// adjust the review's score by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteChange {
    /// Which vote.
    pub key: VoteKey,
    /// The vote the decision was based on.
    pub expected: Option<VoteKind>,
    /// The vote to store (`None` deletes it).
    pub next: Option<VoteKind>,
    /// Score adjustment; always `contribution(next) - contribution(expected)`.
    pub delta: i64,
}

/// The aggregate root for one user's vote on one review.
#[derive(Debug)]
pub struct ReviewVote {
    key: VoteKey,
    loaded: Option<VoteKind>,
    current: Option<VoteKind>,
    uncommitted_events: Vec<NewEvent>,
}

impl ReviewVote {
    /// Wraps a loaded vote (or its absence).
    #[must_use]
    pub fn load(review_id: ReviewId, user_id: UserId, loaded: Option<VoteKind>) -> Self {
        Self {
            key: VoteKey { review_id, user_id },
            loaded,
            current: loaded,
            uncommitted_events: Vec::new(),
        }
    }

    /// The current (possibly uncommitted) vote.
    #[must_use]
    pub fn current(&self) -> Option<VoteKind> {
        self.current
    }

    /// The storage change needed to persist this aggregate.
    #[must_use]
    pub fn change(&self) -> VoteChange {
        VoteChange {
            key: self.key,
            expected: self.loaded,
            next: self.current,
            delta: contribution(self.current) - contribution(self.loaded),
        }
    }

    /// Casts a vote, or flips an opposite one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the user already cast the same
    /// vote; no delta may be applied twice.
    pub fn set(
        &mut self,
        kind: VoteKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let operation = match self.current {
            Some(existing) if existing == kind => {
                return Err(DomainError::Conflict(format!(
                    "user {} has already {} review {}",
                    self.key.user_id,
                    kind.verb(),
                    self.key.review_id
                )));
            }
            Some(_) => EventOperation::Update,
            None => EventOperation::Add,
        };
        self.current = Some(kind);
        self.record(operation, correlation_id, clock);
        Ok(())
    }

    /// Withdraws the vote.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if there is no vote to withdraw.
    pub fn remove(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.current.is_none() {
            return Err(DomainError::not_found(EntityKind::Vote, self.key));
        }
        self.current = None;
        self.record(EventOperation::Remove, correlation_id, clock);
        Ok(())
    }

    fn record(&mut self, operation: EventOperation, correlation_id: Uuid, clock: &dyn Clock) {
        self.uncommitted_events.push(NewEvent::new(
            self.key.user_id,
            EventType::Review,
            operation,
            self.key.review_id.get(),
            correlation_id,
            clock,
        ));
    }
}

impl AggregateRoot for ReviewVote {
    type Key = VoteKey;

    fn key(&self) -> VoteKey {
        self.key
    }

    fn is_dirty(&self) -> bool {
        self.current != self.loaded
    }

    fn uncommitted_events(&self) -> &[NewEvent] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<NewEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

/// A film review with its cached usefulness score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Review identifier.
    pub review_id: ReviewId,
    /// Review text.
    pub content: String,
    /// Whether the review recommends the film.
    pub is_positive: bool,
    /// The author.
    pub user_id: UserId,
    /// The reviewed film.
    pub film_id: FilmId,
    /// Cached sum of vote contributions.
    pub useful: i64,
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::InvalidArgument(
            "review content must not be empty".into(),
        ));
    }
    Ok(())
}

impl Review {
    /// Builds a new review with a zero score and its `REVIEW/ADD` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the content is blank.
    pub fn create(
        review_id: ReviewId,
        content: String,
        is_positive: bool,
        user_id: UserId,
        film_id: FilmId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(Self, NewEvent), DomainError> {
        validate_content(&content)?;
        let review = Self {
            review_id,
            content,
            is_positive,
            user_id,
            film_id,
            useful: 0,
        };
        let event = review.event(EventOperation::Add, correlation_id, clock);
        Ok((review, event))
    }

    /// Replaces text and polarity; the score is untouched.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if the content is blank.
    pub fn edit(
        &mut self,
        content: String,
        is_positive: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<NewEvent, DomainError> {
        validate_content(&content)?;
        self.content = content;
        self.is_positive = is_positive;
        Ok(self.event(EventOperation::Update, correlation_id, clock))
    }

    /// The `REVIEW/REMOVE` event recorded when this review is deleted.
    #[must_use]
    pub fn deletion_event(&self, correlation_id: Uuid, clock: &dyn Clock) -> NewEvent {
        self.event(EventOperation::Remove, correlation_id, clock)
    }

    fn event(&self, operation: EventOperation, correlation_id: Uuid, clock: &dyn Clock) -> NewEvent {
        NewEvent::new(
            self.user_id,
            EventType::Review,
            operation,
            self.review_id.get(),
            correlation_id,
            clock,
        )
    }
}
