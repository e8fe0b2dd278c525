//! In-memory backend.
//!
//! Every store is striped by its aggregate key. A commit checks the expected
//! state, records its feed events, then applies the change, all under the
//! aggregate's stripe lock. Locks are always taken aggregate first, feed
//! second.

mod directory;
mod feed;
mod friendship;
mod likes;
mod reviews;
mod shard;

use std::sync::Arc;

pub use directory::MemoryDirectory;
pub use feed::MemoryFeed;
pub use friendship::MemoryFriendships;
pub use likes::MemoryLikes;
pub use reviews::MemoryReviews;

/// All in-memory stores wired to one shared feed.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    /// User and film catalog.
    pub directory: Arc<MemoryDirectory>,
    /// Friendship edges.
    pub friendships: Arc<MemoryFriendships>,
    /// Film likes.
    pub likes: Arc<MemoryLikes>,
    /// Reviews and their votes.
    pub reviews: Arc<MemoryReviews>,
    /// The event log.
    pub feed: Arc<MemoryFeed>,
}

impl MemoryBackend {
    /// Builds every store on top of `directory`.
    #[must_use]
    pub fn new(directory: MemoryDirectory) -> Self {
        let feed = Arc::new(MemoryFeed::new());
        Self {
            directory: Arc::new(directory),
            friendships: Arc::new(MemoryFriendships::new(Arc::clone(&feed))),
            likes: Arc::new(MemoryLikes::new(Arc::clone(&feed))),
            reviews: Arc::new(MemoryReviews::new(Arc::clone(&feed))),
            feed,
        }
    }

    /// Builds every store on an open directory.
    #[must_use]
    pub fn open() -> Self {
        Self::new(MemoryDirectory::open())
    }
}
