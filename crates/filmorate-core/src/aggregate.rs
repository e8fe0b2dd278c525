//! Aggregate root abstraction.
//!
//! Aggregates in the social core are small: a friendship edge pair, one
//! vote, one like. Each is loaded from storage, asked to decide a
//! transition, and committed together with the feed events it produced.

use std::fmt;

use crate::event::NewEvent;

/// Trait for aggregates that are committed by compare-and-swap against the
/// state they were loaded from.
pub trait AggregateRoot: Send + Sync {
    /// The storage key identifying this aggregate.
    type Key: fmt::Display;

    /// Returns the aggregate key.
    fn key(&self) -> Self::Key;

    /// Returns true if the current state differs from the loaded state.
    fn is_dirty(&self) -> bool;

    /// Returns feed events produced by command handling.
    fn uncommitted_events(&self) -> &[NewEvent];

    /// Drains the uncommitted events for persistence.
    fn take_uncommitted_events(&mut self) -> Vec<NewEvent>;
}
