//! Shared domain abstractions for the Filmorate social core.
//!
//! This crate defines the identifiers, error taxonomy, clock, feed event
//! types and storage traits that every bounded context depends on. It
//! contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod directory;
pub mod error;
pub mod event;
pub mod ids;
pub mod repository;
pub mod retry;
