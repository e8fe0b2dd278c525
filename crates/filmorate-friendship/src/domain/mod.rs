//! Domain layer for the Friendship context.

pub mod aggregates;
pub mod commands;
pub mod repository;
