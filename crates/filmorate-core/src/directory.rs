//! Existence checks against the user and film catalog.
//!
//! User and film records are owned by the CRUD layer; the social core only
//! needs to know whether an id resolves.

use async_trait::async_trait;

use crate::error::{DomainError, EntityKind};
use crate::ids::{FilmId, UserId};

/// Narrow read-only view of the user and film catalog.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns true if the user exists.
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DomainError>;

    /// Returns true if the film exists.
    async fn film_exists(&self, film_id: FilmId) -> Result<bool, DomainError>;
}

/// Fails with `NotFound` unless the user exists.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown user, or the directory's
/// own error if the lookup fails.
pub async fn ensure_user(directory: &dyn Directory, user_id: UserId) -> Result<(), DomainError> {
    if directory.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(DomainError::not_found(EntityKind::User, user_id))
    }
}

/// Fails with `NotFound` unless the film exists.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown film, or the directory's
/// own error if the lookup fails.
pub async fn ensure_film(directory: &dyn Directory, film_id: FilmId) -> Result<(), DomainError> {
    if directory.film_exists(film_id).await? {
        Ok(())
    } else {
        Err(DomainError::not_found(EntityKind::Film, film_id))
    }
}
