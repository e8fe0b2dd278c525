//! Shared application state.

use std::sync::Arc;

use filmorate_activity::{ActivityOrchestrator, Stores};
use filmorate_core::clock::Clock;
use filmorate_store::memory::MemoryBackend;
use filmorate_store::postgres::PgBackend;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Entry point to the social core.
    pub activity: ActivityOrchestrator,
}

impl AppState {
    /// Create new application state around an orchestrator.
    #[must_use]
    pub fn new(activity: ActivityOrchestrator) -> Self {
        Self { activity }
    }

    /// State backed by the in-memory stores.
    #[must_use]
    pub fn in_memory(backend: MemoryBackend, clock: Arc<dyn Clock>) -> Self {
        let stores = Stores {
            directory: backend.directory,
            friendships: backend.friendships,
            likes: backend.likes,
            reviews: backend.reviews.clone(),
            votes: backend.reviews,
            feed: backend.feed,
        };
        Self::new(ActivityOrchestrator::new(stores, clock))
    }

    /// State backed by PostgreSQL.
    #[must_use]
    pub fn postgres(backend: PgBackend, clock: Arc<dyn Clock>) -> Self {
        let reviews = Arc::new(backend.reviews);
        let stores = Stores {
            directory: Arc::new(backend.directory),
            friendships: Arc::new(backend.friendships),
            likes: Arc::new(backend.likes),
            reviews: reviews.clone(),
            votes: reviews,
            feed: Arc::new(backend.feed),
        };
        Self::new(ActivityOrchestrator::new(stores, clock))
    }
}
