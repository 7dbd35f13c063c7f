//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::User;
use super::store::UserStore;
use super::token::{TokenCodec, TokenError};
use crate::common::{safe_email_log, ApiError, AppState};

/// Validate a bearer credential and resolve the caller's identity.
///
/// The header value may be either `Bearer <token>` or a bare token; the last
/// whitespace-delimited piece is taken as the token. Stateless per call.
pub async fn authenticate(
    codec: &TokenCodec,
    users: &UserStore,
    header: Option<&str>,
) -> Result<User, ApiError> {
    let header = header.ok_or_else(|| {
        warn!("Authentication failed: missing Authorization header");
        ApiError::MissingCredential
    })?;

    let token = header
        .split_whitespace()
        .last()
        .ok_or(ApiError::MissingCredential)?;

    let subject = codec.parse(token).map_err(|e| match e {
        TokenError::Expired => {
            warn!("Authentication failed: token expired");
            ApiError::TokenExpired
        }
        TokenError::Invalid => {
            warn!("Authentication failed: token invalid");
            ApiError::TokenInvalid
        }
    })?;

    // A structurally valid token may still reference a user that no longer
    // exists
    let user = users
        .find_by_id(&subject)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %subject, "Authentication failed: user not found");
            ApiError::UserNotFound
        })?;

    debug!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User authentication successful"
    );

    Ok(user)
}

/// Authenticated user extractor for protected routes
#[derive(Debug)]
pub struct AuthedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let users = UserStore::new(app_state.db.clone());
        let user = authenticate(&app_state.token_codec, &users, header).await?;

        Ok(AuthedUser(user))
    }
}
