//! Activity bounded context.
//!
//! Owns the user activity feed and the orchestrator that sequences
//! existence checks and aggregate commands across the friendship, likes and
//! reviews contexts. Every state change reaches the feed through the
//! aggregate store that commits it; the orchestrator never appends events
//! for actions that failed.

pub mod feed;
pub mod orchestrator;

pub use orchestrator::{ActivityOrchestrator, Stores};
