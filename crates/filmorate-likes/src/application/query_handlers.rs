//! Query handlers for the Likes context.

use filmorate_core::error::DomainError;
use filmorate_core::ids::{FilmId, UserId};
use serde::Serialize;
use tracing::debug;

use crate::domain::recommendation::{most_similar_user, unseen_films};
use crate::domain::repository::LikeRepository;

/// Films recommended to a user, with the neighbour they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationView {
    /// The user recommendations are for.
    pub user_id: UserId,
    /// The most similar user, if anyone shares a liked film.
    pub similar_user_id: Option<UserId>,
    /// Number of films both users like.
    pub overlap: usize,
    /// Recommended films, ascending by id.
    pub film_ids: Vec<FilmId>,
}

/// Recommends the films liked by the user's most similar neighbour that
/// the user has not liked yet. No likes or no overlap yields an empty list.
///
/// # Errors
///
/// Returns the repository's error if loading fails.
pub async fn recommend_films(
    user_id: UserId,
    repo: &dyn LikeRepository,
) -> Result<RecommendationView, DomainError> {
    let overlap = repo.co_likers(user_id).await?;
    let Some(similar) = most_similar_user(&overlap) else {
        debug!(%user_id, "no overlapping likes, nothing to recommend");
        return Ok(RecommendationView {
            user_id,
            similar_user_id: None,
            overlap: 0,
            film_ids: Vec::new(),
        });
    };

    let liked = repo.liked_films(user_id).await?;
    let neighbour_likes = repo.liked_films(similar.user_id).await?;
    Ok(RecommendationView {
        user_id,
        similar_user_id: Some(similar.user_id),
        overlap: similar.overlap,
        film_ids: unseen_films(&liked, &neighbour_likes),
    })
}
