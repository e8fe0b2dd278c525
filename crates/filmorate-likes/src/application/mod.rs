//! Application layer for the Likes context.

pub mod command_handlers;
pub mod query_handlers;
