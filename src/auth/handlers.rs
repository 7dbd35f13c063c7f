//! Authentication handlers

use axum::{
    extract::{Extension, Query},
    response::Redirect,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::extractors::AuthedUser;
use crate::common::{ApiError, AppState};

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /auth/google/login - Start the Google OAuth flow
///
/// Redirects (302) to Google's authorization page, or returns a structured
/// 500 body when the OAuth credentials are not configured.
pub async fn google_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let auth_url = state.auth_service.begin_login()?;
    Ok(Redirect::to(&auth_url))
}

/// GET /auth/google/callback?code=... - Handle the provider redirect
///
/// On success the user agent is redirected to the client application with
/// the issued token embedded as the `key_token` query parameter. Missing
/// code, a failed exchange, and an unverified email all yield structured
/// 400 bodies.
pub async fn google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let redirect_url = state
        .auth_service
        .complete_login(params.code.as_deref())
        .await?;

    Ok(Redirect::to(&redirect_url))
}

/// POST /auth/jwt/verify - Validate a bearer token
///
/// # Response
/// ```json
/// { "valid": true }
/// ```
/// Structured 400/401/404 bodies for missing, expired/invalid, and
/// orphaned-subject credentials respectively.
pub async fn jwt_verify(_authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(serde_json::json!({ "valid": true })))
}
