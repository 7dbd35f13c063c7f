// Error handling types for the API

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// API error types
///
/// Every failure that crosses the HTTP boundary is one of these variants;
/// component-level errors (provider, codec, store) are translated into them
/// before leaving the auth module.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing client input (missing code, failed exchange)
    BadRequest(String),
    /// Provider reported the account's email address as unverified
    EmailNotVerified,
    /// Authorization header absent on a protected request
    MissingCredential,
    /// Presented token is past its expiry
    TokenExpired,
    /// Presented token failed signature or structural validation
    TokenInvalid,
    /// Token was valid but its subject no longer resolves to a user
    UserNotFound,
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::EmailNotVerified => write!(f, "Bad Request: email not verified"),
            ApiError::MissingCredential => write!(f, "Bad Request: missing credential"),
            ApiError::TokenExpired => write!(f, "Unauthorized: token expired"),
            ApiError::TokenInvalid => write!(f, "Unauthorized: invalid token"),
            ApiError::UserNotFound => write!(f, "Not Found: user not found"),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure: `{status, error, message}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// Bearer challenge hint for 400/401/404 credential failures
    fn www_authenticate(&self) -> Option<&'static str> {
        match self {
            ApiError::MissingCredential => Some("Bearer error=\"invalid_request\""),
            ApiError::TokenExpired | ApiError::TokenInvalid => {
                Some("Bearer error=\"invalid_token\"")
            }
            ApiError::UserNotFound => Some("Bearer error=\"not_found_user\""),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let challenge = self.www_authenticate();

        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::EmailNotVerified => (
                StatusCode::BAD_REQUEST,
                "Your google is not verified email address.".to_string(),
            ),
            ApiError::MissingCredential => (
                StatusCode::BAD_REQUEST,
                "Authorization header is missing.".to_string(),
            ),
            ApiError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired.".to_string()),
            ApiError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid token.".to_string()),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "Not found user.".to_string()),
            ApiError::InternalServer(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(value) = challenge {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(value));
        }
        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}
