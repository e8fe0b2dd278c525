//! Bounded retry of compare-and-swap commits.

use std::future::Future;

use tracing::warn;

use crate::error::DomainError;

/// Number of load-decide-commit rounds before a concurrency conflict is
/// surfaced to the caller.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Runs `attempt` until it returns something other than
/// `DomainError::ConcurrencyConflict`, at most `MAX_COMMIT_ATTEMPTS` times.
///
/// Each attempt must reload the aggregate so the domain decision is re-made
/// against fresh state.
///
/// # Errors
///
/// Returns the last attempt's error.
pub async fn retry_on_conflict<T, F, Fut>(
    operation: &'static str,
    mut attempt: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut tries = 1;
    loop {
        match attempt().await {
            Err(DomainError::ConcurrencyConflict(key)) if tries < MAX_COMMIT_ATTEMPTS => {
                warn!(operation, %key, attempt = tries, "concurrent modification, retrying");
                tries += 1;
            }
            other => return other,
        }
    }
}
