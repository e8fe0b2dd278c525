//! Storage backends for the Filmorate social core.
//!
//! Every repository trait of the bounded contexts is implemented twice:
//! an in-memory backend guarded by sharded locks, and a PostgreSQL backend
//! that commits each state change and its feed events in one transaction.

pub mod memory;
pub mod postgres;

use filmorate_core::error::DomainError;
use tracing::debug;

/// Rejects a commit whose expected state no longer matches storage. The
/// caller's retry loop reloads and decides again.
pub(crate) fn stale_commit(key: String) -> DomainError {
    debug!(%key, "stored state changed since load, rejecting commit");
    DomainError::ConcurrencyConflict(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_commit_is_concurrency_conflict_on_key() {
        match stale_commit("film 3 by user 4".to_string()) {
            DomainError::ConcurrencyConflict(key) => assert_eq!(key, "film 3 by user 4"),
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
    }
}
