//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/google/login` - Redirect to Google's authorization page
/// - `GET /auth/google/callback` - Provider redirect target
/// - `POST /auth/jwt/verify` - Bearer token validation
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google/login", get(handlers::google_login))
        .route("/auth/google/callback", get(handlers::google_callback))
        .route("/auth/jwt/verify", post(handlers::jwt_verify))
}
