//! Integration tests for likes and recommendations over PostgreSQL.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_like_round_trip(pool: PgPool) {
    common::seed(&pool, 1, 1).await;

    let (status, _) =
        common::put(common::build_test_app(pool.clone()), "/api/v1/films/1/like/1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) =
        common::put(common::build_test_app(pool.clone()), "/api/v1/films/1/like/1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");

    let (status, _) =
        common::delete(common::build_test_app(pool.clone()), "/api/v1/films/1/like/1").await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = common::get_json(common::build_test_app(pool), "/api/v1/users/1/feed").await;
    let operations: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, vec!["ADD", "REMOVE"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_like_of_unknown_film_returns_404(pool: PgPool) {
    common::seed(&pool, 1, 0).await;

    let (status, json) = common::put(common::build_test_app(pool), "/api/v1/films/5/like/1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_recommendations_from_most_similar_user(pool: PgPool) {
    common::seed(&pool, 3, 4).await;
    for (film, user) in [(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (4, 2), (1, 3)] {
        let uri = format!("/api/v1/films/{film}/like/{user}");
        let (status, _) = common::put(common::build_test_app(pool.clone()), &uri).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = common::get_json(
        common::build_test_app(pool),
        "/api/v1/users/1/recommendations",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["similar_user_id"], 2);
    assert_eq!(json["film_ids"], json!([4]));
}
