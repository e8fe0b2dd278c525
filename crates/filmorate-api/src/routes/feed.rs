//! Routes for the user activity feed.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use filmorate_activity::feed::AppendEvent;
use filmorate_core::event::{EventOperation, EventType, FeedEvent};
use filmorate_core::ids::UserId;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// Request body for POST /{id}/feed.
#[derive(Debug, Deserialize)]
pub struct AppendEventRequest {
    /// Entity kind.
    pub event_type: EventType,
    /// Operation performed.
    pub operation: EventOperation,
    /// Identifier of the affected entity.
    pub entity_id: i64,
}

/// GET /{id}/feed
#[instrument(skip(state))]
async fn get_feed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FeedEvent>>, ApiError> {
    let events = state.activity.feed(UserId::parse(id)?).await?;
    Ok(Json(events))
}

/// POST /{id}/feed
#[instrument(skip(state, request), fields(event_type = %request.event_type))]
async fn append_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AppendEventRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = AppendEvent {
        correlation_id: Uuid::new_v4(),
        user_id: UserId::parse(id)?,
        event_type: request.event_type,
        operation: request.operation,
        entity_id: request.entity_id,
    };

    info!(correlation_id = %command.correlation_id, "handling append_event command");

    let event = state.activity.append_event(&command).await?;
    Ok(Json(CommandResponse::from_events(&[event])))
}

/// Returns the router for the feed.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/feed", get(get_feed).post(append_event))
}
