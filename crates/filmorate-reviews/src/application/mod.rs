//! Application layer for the Reviews context.

pub mod command_handlers;
pub mod query_handlers;
