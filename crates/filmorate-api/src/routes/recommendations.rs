//! Film recommendations.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use filmorate_core::ids::UserId;
use filmorate_likes::application::query_handlers::RecommendationView;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{id}/recommendations
#[instrument(skip(state))]
async fn recommend(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecommendationView>, ApiError> {
    let view = state.activity.recommend(UserId::parse(id)?).await?;
    Ok(Json(view))
}

/// Returns the router for recommendations.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/recommendations", get(recommend))
}
