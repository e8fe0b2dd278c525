//! Routes for the Friendship context.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use filmorate_core::ids::UserId;
use filmorate_friendship::application::query_handlers::FriendView;
use filmorate_friendship::domain::commands::{RemoveFriend, RequestFriend};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// PUT /{id}/friends/{friend_id}
#[instrument(skip(state))]
async fn request_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RequestFriend {
        correlation_id: Uuid::new_v4(),
        owner_id: UserId::parse(id)?,
        target_id: UserId::parse(friend_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling request_friend command");

    let events = state.activity.request_friend(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// DELETE /{id}/friends/{friend_id}
#[instrument(skip(state))]
async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RemoveFriend {
        correlation_id: Uuid::new_v4(),
        owner_id: UserId::parse(id)?,
        target_id: UserId::parse(friend_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_friend command");

    let events = state.activity.remove_friend(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// GET /{id}/friends
#[instrument(skip(state))]
async fn list_friends(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FriendView>>, ApiError> {
    let friends = state.activity.friends(UserId::parse(id)?).await?;
    Ok(Json(friends))
}

/// GET /{id}/friends/common/{other_id}
#[instrument(skip(state))]
async fn common_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<UserId>>, ApiError> {
    let common = state
        .activity
        .common_friends(UserId::parse(id)?, UserId::parse(other_id)?)
        .await?;
    Ok(Json(common))
}

/// Returns the router for the friendship context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/friends", get(list_friends))
        .route(
            "/{id}/friends/{friend_id}",
            put(request_friend).delete(remove_friend),
        )
        .route("/{id}/friends/common/{other_id}", get(common_friends))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::router;
    use crate::routes::test_support::{memory_state, send};

    #[tokio::test]
    async fn test_request_friend_returns_event_id() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (status, json) = send(&app, "PUT", "/1/friends/2", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reciprocal_requests_confirm_both_sides() {
        // Arrange
        let app = router().with_state(memory_state());
        send(&app, "PUT", "/1/friends/2", None).await;

        // Act
        let (_, pending) = send(&app, "GET", "/2/friends", None).await;
        send(&app, "PUT", "/2/friends/1", None).await;
        let (status, confirmed) = send(&app, "GET", "/1/friends", None).await;

        // Assert
        assert_eq!(pending, json!([]));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed, json!([{ "user_id": 2, "status": "CONFIRMED" }]));
    }

    #[tokio::test]
    async fn test_self_friendship_returns_400() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (status, json) = send(&app, "PUT", "/3/friends/3", None).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_non_positive_id_returns_400() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (status, json) = send(&app, "GET", "/0/friends", None).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_common_friends_lists_shared_targets() {
        // Arrange
        let app = router().with_state(memory_state());
        for uri in ["/1/friends/3", "/2/friends/3", "/1/friends/4"] {
            send(&app, "PUT", uri, None).await;
        }

        // Act
        let (status, json) = send(&app, "GET", "/1/friends/common/2", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([3]));
    }

    #[tokio::test]
    async fn test_remove_absent_friend_returns_no_events() {
        // Arrange
        let app = router().with_state(memory_state());

        // Act
        let (status, json) = send(&app, "DELETE", "/1/friends/2", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"], json!([]));
    }
}
