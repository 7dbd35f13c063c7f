//! Timeline routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates the timeline router
///
/// # Routes
/// - `GET /api/timeline` - List timeline posts (public)
/// - `POST /api/timeline` - Create a post (requires bearer token)
pub fn timeline_routes() -> Router {
    Router::new().route(
        "/api/timeline",
        get(handlers::list_posts).post(handlers::create_post),
    )
}
