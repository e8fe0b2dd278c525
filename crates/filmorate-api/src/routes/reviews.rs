//! Routes for reviews and their usefulness votes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use filmorate_core::event::FeedEvent;
use filmorate_core::ids::{EventId, FilmId, ReviewId, UserId};
use filmorate_reviews::application::query_handlers::ReviewScoreView;
use filmorate_reviews::domain::aggregates::Review;
use filmorate_reviews::domain::commands::{
    CreateReview, DeleteReview, RemoveVote, SetVote, UpdateReview,
};
use filmorate_reviews::domain::repository::ScoreReconciliation;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    /// Review text.
    pub content: String,
    /// Whether the review is favourable.
    pub is_positive: bool,
    /// The author.
    pub user_id: i64,
    /// The film under review.
    pub film_id: i64,
}

/// Request body for PUT /{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    /// New review text.
    pub content: String,
    /// New polarity.
    pub is_positive: bool,
}

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct ListReviewsQuery {
    /// Restrict the listing to one film.
    pub film_id: Option<i64>,
    /// Maximum number of reviews returned.
    pub count: Option<i64>,
}

/// A review together with the feed events its command produced.
#[derive(Debug, Serialize)]
pub struct ReviewCommandResponse {
    /// The review after the command.
    #[serde(flatten)]
    pub review: Review,
    /// IDs of the feed events the command produced.
    pub event_ids: Vec<EventId>,
}

impl ReviewCommandResponse {
    fn new(review: Review, event: &FeedEvent) -> Self {
        Self {
            review,
            event_ids: vec![event.event_id],
        }
    }
}

/// POST /
#[instrument(skip(state, request), fields(user_id = request.user_id, film_id = request.film_id))]
async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ReviewCommandResponse>, ApiError> {
    let command = CreateReview {
        correlation_id: Uuid::new_v4(),
        content: request.content,
        is_positive: request.is_positive,
        user_id: UserId::parse(request.user_id)?,
        film_id: FilmId::parse(request.film_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling create_review command");

    let (review, event) = state.activity.create_review(&command).await?;
    Ok(Json(ReviewCommandResponse::new(review, &event)))
}

/// GET /
#[instrument(skip(state))]
async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let film_id = query.film_id.map(FilmId::parse).transpose()?;
    let reviews = state.activity.reviews(film_id, query.count).await?;
    Ok(Json(reviews))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>, ApiError> {
    let review = state.activity.review(ReviewId::parse(id)?).await?;
    Ok(Json(review))
}

/// PUT /{id}
#[instrument(skip(state, request))]
async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewCommandResponse>, ApiError> {
    let command = UpdateReview {
        correlation_id: Uuid::new_v4(),
        review_id: ReviewId::parse(id)?,
        content: request.content,
        is_positive: request.is_positive,
    };

    info!(correlation_id = %command.correlation_id, "handling update_review command");

    let (review, event) = state.activity.update_review(&command).await?;
    Ok(Json(ReviewCommandResponse::new(review, &event)))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = DeleteReview {
        correlation_id: Uuid::new_v4(),
        review_id: ReviewId::parse(id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_review command");

    let event = state.activity.delete_review(&command).await?;
    Ok(Json(CommandResponse::from_events(&[event])))
}

async fn set_vote(
    state: &AppState,
    id: i64,
    user_id: i64,
    is_positive: bool,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = SetVote {
        correlation_id: Uuid::new_v4(),
        review_id: ReviewId::parse(id)?,
        user_id: UserId::parse(user_id)?,
        is_positive,
    };

    info!(correlation_id = %command.correlation_id, is_positive, "handling set_vote command");

    let events = state.activity.set_vote(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// PUT /{id}/like/{user_id}
#[instrument(skip(state))]
async fn like_review(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    set_vote(&state, id, user_id, true).await
}

/// PUT /{id}/dislike/{user_id}
#[instrument(skip(state))]
async fn dislike_review(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    set_vote(&state, id, user_id, false).await
}

/// DELETE /{id}/like/{user_id} and DELETE /{id}/dislike/{user_id}
#[instrument(skip(state))]
async fn remove_vote(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RemoveVote {
        correlation_id: Uuid::new_v4(),
        review_id: ReviewId::parse(id)?,
        user_id: UserId::parse(user_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_vote command");

    let events = state.activity.remove_vote(&command).await?;
    Ok(Json(CommandResponse::from_events(&events)))
}

/// GET /{id}/score
#[instrument(skip(state))]
async fn review_score(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReviewScoreView>, ApiError> {
    let view = state.activity.review_score(ReviewId::parse(id)?).await?;
    Ok(Json(view))
}

/// POST /{id}/score/reconcile
#[instrument(skip(state))]
async fn reconcile_score(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ScoreReconciliation>, ApiError> {
    let outcome = state
        .activity
        .reconcile_review_score(ReviewId::parse(id)?)
        .await?;
    Ok(Json(outcome))
}

/// Returns the router for reviews.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review).get(list_reviews))
        .route(
            "/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/{id}/like/{user_id}", put(like_review).delete(remove_vote))
        .route(
            "/{id}/dislike/{user_id}",
            put(dislike_review).delete(remove_vote),
        )
        .route("/{id}/score", get(review_score))
        .route("/{id}/score/reconcile", post(reconcile_score))
}
