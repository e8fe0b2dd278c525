//! In-memory user and film catalog.

use std::collections::HashSet;

use async_trait::async_trait;
use filmorate_core::directory::Directory;
use filmorate_core::error::DomainError;
use filmorate_core::ids::{FilmId, UserId};

/// Catalog used by the in-memory backend. An open catalog accepts every id;
/// a registered one only the ids it was built with.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    registered: Option<(HashSet<UserId>, HashSet<FilmId>)>,
}

impl MemoryDirectory {
    /// A catalog where every user and film exists.
    #[must_use]
    pub fn open() -> Self {
        Self { registered: None }
    }

    /// A catalog containing exactly the given users and films.
    #[must_use]
    pub fn with_catalog(
        users: impl IntoIterator<Item = UserId>,
        films: impl IntoIterator<Item = FilmId>,
    ) -> Self {
        Self {
            registered: Some((users.into_iter().collect(), films.into_iter().collect())),
        }
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DomainError> {
        Ok(self
            .registered
            .as_ref()
            .is_none_or(|(users, _)| users.contains(&user_id)))
    }

    async fn film_exists(&self, film_id: FilmId) -> Result<bool, DomainError> {
        Ok(self
            .registered
            .as_ref()
            .is_none_or(|(_, films)| films.contains(&film_id)))
    }
}
