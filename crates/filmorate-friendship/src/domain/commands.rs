//! Commands for the Friendship context.

use filmorate_core::command::Command;
use filmorate_core::ids::UserId;
use uuid::Uuid;

/// Command to request (or accept) a friendship.
#[derive(Debug, Clone)]
pub struct RequestFriend {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user sending the request.
    pub owner_id: UserId,
    /// The user being befriended.
    pub target_id: UserId,
}

impl Command for RequestFriend {
    fn command_type(&self) -> &'static str {
        "friendship.request_friend"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}

/// Command to remove a friend.
#[derive(Debug, Clone)]
pub struct RemoveFriend {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user removing their edge.
    pub owner_id: UserId,
    /// The user being removed.
    pub target_id: UserId,
}

impl Command for RemoveFriend {
    fn command_type(&self) -> &'static str {
        "friendship.remove_friend"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}
