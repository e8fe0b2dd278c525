//! Application layer for the Friendship context.

pub mod command_handlers;
pub mod query_handlers;
