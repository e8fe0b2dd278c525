//! Integration tests for friendships over PostgreSQL.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_friendship_round_trip(pool: PgPool) {
    common::seed(&pool, 3, 0).await;

    // PUT /api/v1/users/1/friends/2 leaves a pending edge owned by user 1
    let (status, json) =
        common::put(common::build_test_app(pool.clone()), "/api/v1/users/1/friends/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);

    let (_, friends_of_2) =
        common::get_json(common::build_test_app(pool.clone()), "/api/v1/users/2/friends").await;
    assert_eq!(friends_of_2, json!([]));

    // Reciprocal request confirms both edges
    common::put(common::build_test_app(pool.clone()), "/api/v1/users/2/friends/1").await;
    let (status, friends_of_1) =
        common::get_json(common::build_test_app(pool.clone()), "/api/v1/users/1/friends").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(friends_of_1, json!([{ "user_id": 2, "status": "CONFIRMED" }]));

    // Removing one side demotes the other to pending
    common::delete(common::build_test_app(pool.clone()), "/api/v1/users/1/friends/2").await;
    let (_, friends_of_2) =
        common::get_json(common::build_test_app(pool), "/api/v1/users/2/friends").await;
    assert_eq!(friends_of_2, json!([{ "user_id": 1, "status": "PENDING" }]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_friend_request_to_unknown_user_returns_404(pool: PgPool) {
    common::seed(&pool, 1, 0).await;

    let (status, json) =
        common::put(common::build_test_app(pool.clone()), "/api/v1/users/1/friends/9").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (_, feed) = common::get_json(common::build_test_app(pool), "/api/v1/users/1/feed").await;
    assert_eq!(feed, json!([]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_common_friends(pool: PgPool) {
    common::seed(&pool, 4, 0).await;
    for uri in [
        "/api/v1/users/1/friends/3",
        "/api/v1/users/2/friends/3",
        "/api/v1/users/1/friends/4",
    ] {
        common::put(common::build_test_app(pool.clone()), uri).await;
    }

    let (status, json) = common::get_json(
        common::build_test_app(pool),
        "/api/v1/users/1/friends/common/2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([3]));
}
