//! Likes bounded context: who liked which film, and the recommendations
//! derived from those likes.

pub mod application;
pub mod domain;
