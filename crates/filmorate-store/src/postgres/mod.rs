//! PostgreSQL backend.
//!
//! Each commit runs in one transaction: take the aggregate's lock, compare
//! the stored state with the expected one, write the new state, insert the
//! feed events. Friendship pairs and likes are serialized with transaction
//! scoped advisory locks; votes lock their review row.

mod directory;
mod feed;
mod friendship;
mod likes;
mod reviews;

use filmorate_core::error::DomainError;
use sqlx::PgConnection;
use sqlx::PgPool;
use sqlx::migrate::MigrateError;
use tracing::warn;

pub use directory::PgDirectory;
pub use feed::PgFeed;
pub use friendship::PgFriendships;
pub use likes::PgLikes;
pub use reviews::PgReviews;

/// All PostgreSQL stores sharing one pool.
#[derive(Debug, Clone)]
pub struct PgBackend {
    /// User and film catalog.
    pub directory: PgDirectory,
    /// Friendship edges.
    pub friendships: PgFriendships,
    /// Film likes.
    pub likes: PgLikes,
    /// Reviews and their votes.
    pub reviews: PgReviews,
    /// The event log.
    pub feed: PgFeed,
}

impl PgBackend {
    /// Builds every store on `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            directory: PgDirectory::new(pool.clone()),
            friendships: PgFriendships::new(pool.clone()),
            likes: PgLikes::new(pool.clone()),
            reviews: PgReviews::new(pool.clone()),
            feed: PgFeed::new(pool),
        }
    }
}

/// Applies the schema migrations.
///
/// # Errors
///
/// Returns the migrator's error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    warn!(error = %err, "database operation failed");
    DomainError::Internal(format!("database error: {err}"))
}

/// Serializes transactions on `key` until the current transaction ends.
pub(crate) async fn advisory_lock(conn: &mut PgConnection, key: &str) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}
