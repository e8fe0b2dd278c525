//! Friendship bounded context.
//!
//! Maintains directed friendship edges between users and their
//! confirmation status. Both edges between a pair of users are always
//! loaded and committed together so reciprocity can never be observed
//! half-applied.

pub mod application;
pub mod domain;
