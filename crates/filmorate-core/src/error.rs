//! Domain error types.

use std::fmt;

use thiserror::Error;

/// Kind of entity referenced by a `DomainError::NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A registered user.
    User,
    /// A catalog film.
    Film,
    /// A film review.
    Review,
    /// A usefulness vote on a review.
    Vote,
    /// A like on a film.
    Like,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "user",
            Self::Film => "film",
            Self::Review => "review",
            Self::Vote => "vote",
            Self::Like => "like",
        };
        f.write_str(label)
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What kind of entity was looked up.
        kind: EntityKind,
        /// The key that failed to resolve.
        key: String,
    },

    /// The request is malformed (self-friendship, non-positive id, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request is well-formed but would repeat an effect that already
    /// holds (already friends, same vote twice, duplicate like).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored state changed between load and commit.
    #[error("concurrency conflict on {0}")]
    ConcurrencyConflict(String),

    /// Storage failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_kind_and_key() {
        let err = DomainError::not_found(EntityKind::Review, 12);
        assert_eq!(err.to_string(), "review not found: 12");
    }

    #[test]
    fn test_concurrency_conflict_display() {
        let err = DomainError::ConcurrencyConflict("friendship 1-2".into());
        assert_eq!(err.to_string(), "concurrency conflict on friendship 1-2");
    }
}
