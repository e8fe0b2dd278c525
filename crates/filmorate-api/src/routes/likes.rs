//! Routes for film likes.

use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};
use filmorate_core::ids::{FilmId, UserId};
use filmorate_likes::domain::commands::{AddLike, RemoveLike};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// PUT /{id}/like/{user_id}
#[instrument(skip(state))]
async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = AddLike {
        correlation_id: Uuid::new_v4(),
        film_id: FilmId::parse(id)?,
        user_id: UserId::parse(user_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling add_like command");

    let events = state.activity.add_like(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// DELETE /{id}/like/{user_id}
#[instrument(skip(state))]
async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RemoveLike {
        correlation_id: Uuid::new_v4(),
        film_id: FilmId::parse(id)?,
        user_id: UserId::parse(user_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_like command");

    let events = state.activity.remove_like(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// Returns the router for film likes.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/like/{user_id}", put(add_like).delete(remove_like))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::router;
    use crate::routes::test_support::{memory_state, send};

    #[tokio::test]
    async fn test_like_twice_returns_409() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (first, _) = send(&app, "PUT", "/5/like/2", None).await;
        let (second, json) = send(&app, "PUT", "/5/like/2", None).await;

        // Assert
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(json["error"], "conflict");
    }

    #[tokio::test]
    async fn test_remove_missing_like_returns_404() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (status, json) = send(&app, "DELETE", "/5/like/2", None).await;

        // Assert
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_like_then_unlike_returns_one_event_each() {
        // Arrange
        let app = router().with_state(memory_state());
        send(&app, "PUT", "/5/like/2", None).await;

        // Act
        let (status, json) = send(&app, "DELETE", "/5/like/2", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
    }
}
