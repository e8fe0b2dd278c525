//! Domain layer for the Likes context.

pub mod aggregates;
pub mod commands;
pub mod recommendation;
pub mod repository;
