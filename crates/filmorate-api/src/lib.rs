//! HTTP surface of the Filmorate social core.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let users = routes::friends::router()
        .merge(routes::feed::router())
        .merge(routes::recommendations::router());

    // TODO: Replace CorsLayer::permissive() with an origin allow-list once the
    // frontend host is fixed.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/users", users)
        .nest("/api/v1/films", routes::likes::router())
        .nest("/api/v1/reviews", routes::reviews::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
