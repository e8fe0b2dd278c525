//! In-memory friendship edges.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use filmorate_core::error::DomainError;
use filmorate_core::event::{FeedEvent, NewEvent};
use filmorate_core::ids::UserId;
use filmorate_friendship::domain::aggregates::{EdgeState, FriendshipStatus};
use filmorate_friendship::domain::repository::{FriendEdge, FriendshipRepository};

use super::feed::MemoryFeed;
use super::shard::Sharded;

use crate::stale_commit;

type Edges = HashMap<(UserId, UserId), FriendshipStatus>;

/// Directed edges striped by the unordered user pair, so both edges between
/// two users always sit behind the same lock.
#[derive(Debug)]
pub struct MemoryFriendships {
    edges: Sharded<Edges>,
    feed: Arc<MemoryFeed>,
}

fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    (a.min(b), a.max(b))
}

fn read_pair(edges: &Edges, owner_id: UserId, target_id: UserId) -> EdgeState {
    EdgeState {
        forward: edges.get(&(owner_id, target_id)).copied(),
        reverse: edges.get(&(target_id, owner_id)).copied(),
    }
}

fn write_edge(edges: &mut Edges, key: (UserId, UserId), status: Option<FriendshipStatus>) {
    match status {
        Some(status) => {
            edges.insert(key, status);
        }
        None => {
            edges.remove(&key);
        }
    }
}

impl MemoryFriendships {
    /// Creates an empty edge store that records events into `feed`.
    #[must_use]
    pub fn new(feed: Arc<MemoryFeed>) -> Self {
        Self {
            edges: Sharded::new("friendships"),
            feed,
        }
    }
}

#[async_trait]
impl FriendshipRepository for MemoryFriendships {
    async fn load_pair(
        &self,
        owner_id: UserId,
        target_id: UserId,
    ) -> Result<EdgeState, DomainError> {
        let edges = self.edges.lock(&pair_key(owner_id, target_id))?;
        Ok(read_pair(&edges, owner_id, target_id))
    }

    async fn commit_pair(
        &self,
        owner_id: UserId,
        target_id: UserId,
        expected: EdgeState,
        next: EdgeState,
        events: &[NewEvent],
    ) -> Result<Vec<FeedEvent>, DomainError> {
        let mut edges = self.edges.lock(&pair_key(owner_id, target_id))?;
        if read_pair(&edges, owner_id, target_id) != expected {
            return Err(stale_commit(format!(
                "friendship {owner_id}->{target_id}"
            )));
        }
        let recorded = self.feed.record(events)?;
        write_edge(&mut edges, (owner_id, target_id), next.forward);
        write_edge(&mut edges, (target_id, owner_id), next.reverse);
        Ok(recorded)
    }

    async fn friends_of(&self, owner_id: UserId) -> Result<Vec<FriendEdge>, DomainError> {
        let mut friends = Vec::new();
        self.edges.scan(|edges| {
            friends.extend(
                edges
                    .iter()
                    .filter(|((owner, _), _)| *owner == owner_id)
                    .map(|(&(owner_id, target_id), &status)| FriendEdge {
                        owner_id,
                        target_id,
                        status,
                    }),
            );
        })?;
        Ok(friends)
    }
}

#[cfg(test)]
mod tests {
    use filmorate_core::repository::FeedRepository;
    use filmorate_friendship::application::command_handlers::handle_request_friend;
    use filmorate_friendship::domain::commands::RequestFriend;
    use filmorate_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;

    fn store() -> (Arc<MemoryFeed>, MemoryFriendships) {
        let feed = Arc::new(MemoryFeed::new());
        (Arc::clone(&feed), MemoryFriendships::new(feed))
    }

    #[tokio::test]
    async fn test_commit_pair_rejects_stale_expected_state() {
        // Arrange
        let (feed, store) = store();
        let pending = EdgeState {
            forward: Some(FriendshipStatus::Pending),
            reverse: None,
        };
        store
            .commit_pair(UserId(1), UserId(2), EdgeState::default(), pending, &[])
            .await
            .unwrap();

        // Act
        let result = store
            .commit_pair(UserId(1), UserId(2), EdgeState::default(), pending, &[])
            .await;

        // Assert
        assert!(matches!(result, Err(DomainError::ConcurrencyConflict(_))));
        assert!(feed.load_feed(UserId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_pair_from_either_side_sees_both_edges() {
        // Arrange
        let (_, store) = store();
        let next = EdgeState {
            forward: Some(FriendshipStatus::Pending),
            reverse: None,
        };
        store
            .commit_pair(UserId(5), UserId(3), EdgeState::default(), next, &[])
            .await
            .unwrap();

        // Act
        let seen_by_target = store.load_pair(UserId(3), UserId(5)).await.unwrap();

        // Assert
        assert_eq!(seen_by_target, next.flipped());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reciprocal_requests_confirm_both_edges() {
        for _ in 0..50 {
            // Arrange
            let (feed, store) = store();
            let store = Arc::new(store);
            let request = |owner: i64, target: i64| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let command = RequestFriend {
                        correlation_id: Uuid::new_v4(),
                        owner_id: UserId(owner),
                        target_id: UserId(target),
                    };
                    handle_request_friend(&command, &FixedClock::default(), store.as_ref())
                        .await
                })
            };

            // Act
            let a = request(1, 2);
            let b = request(2, 1);
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();

            // Assert
            assert_eq!(
                store.load_pair(UserId(1), UserId(2)).await.unwrap(),
                EdgeState::MUTUAL
            );
            assert_eq!(feed.load_feed(UserId(1)).await.unwrap().len(), 1);
            assert_eq!(feed.load_feed(UserId(2)).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_friends_of_lists_only_owned_edges() {
        // Arrange
        let (_, store) = store();
        let pending = EdgeState {
            forward: Some(FriendshipStatus::Pending),
            reverse: None,
        };
        for target in [2, 3, 4] {
            store
                .commit_pair(UserId(1), UserId(target), EdgeState::default(), pending, &[])
                .await
                .unwrap();
        }
        store
            .commit_pair(UserId(9), UserId(1), EdgeState::default(), pending, &[])
            .await
            .unwrap();

        // Act
        let mut targets: Vec<i64> = store
            .friends_of(UserId(1))
            .await
            .unwrap()
            .iter()
            .map(|e| e.target_id.get())
            .collect();
        targets.sort_unstable();

        // Assert
        assert_eq!(targets, vec![2, 3, 4]);
    }
}
