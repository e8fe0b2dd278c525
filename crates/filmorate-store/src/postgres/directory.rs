//! PostgreSQL user and film catalog lookups.

use async_trait::async_trait;
use filmorate_core::directory::Directory;
use filmorate_core::error::DomainError;
use filmorate_core::ids::{FilmId, UserId};
use sqlx::PgPool;

use super::db_error;

/// Existence checks against the `users` and `films` tables.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Creates a new `PgDirectory`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn film_exists(&self, film_id: FilmId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM films WHERE film_id = $1)")
            .bind(film_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}
