//! Command abstractions.

use uuid::Uuid;

use crate::ids::UserId;

/// Trait that all state-changing commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The user acting, when the command names one. Commands that act on an
    /// existing record (editing a review) resolve the actor from storage and
    /// return `None`.
    fn actor_id(&self) -> Option<UserId>;
}
