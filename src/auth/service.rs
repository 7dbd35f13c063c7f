// src/auth/service.rs
//! Login flow orchestration: provider exchange, user resolution, token
//! issuance.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::provider::{IdentityProvider, ProviderError};
use super::store::{StoreError, TokenStore, UserStore};
use super::token::TokenCodec;
use crate::common::{safe_email_log, ApiError};

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotConfigured => ApiError::InternalServer(
                "OAuth client credentials are not configured.".to_string(),
            ),
            // Exchange failures are a user-recoverable condition: the code
            // may be expired, reused, or invalid. Detail stays in the logs.
            ProviderError::CodeExchangeFailed(_) => ApiError::BadRequest(
                "Failed to retrieve the access token for Google login.".to_string(),
            ),
            ProviderError::ProfileFetchFailed(_) => ApiError::BadRequest(
                "Failed to fetch the user profile from Google.".to_string(),
            ),
            ProviderError::MalformedProfile(_) => {
                ApiError::BadRequest("Google returned a malformed profile.".to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            // Raced creates are resolved by the caller; reaching this
            // conversion means the re-resolution itself failed
            StoreError::DuplicateEmail => {
                ApiError::InternalServer("user resolution failed".to_string())
            }
            StoreError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

/// Orchestrates the OAuth2 login flow end to end
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    users: UserStore,
    tokens: TokenStore,
    codec: TokenCodec,
    callback_uri: String,
    web_url: String,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: UserStore,
        tokens: TokenStore,
        codec: TokenCodec,
        callback_uri: String,
        web_url: String,
    ) -> Self {
        Self {
            provider,
            users,
            tokens,
            codec,
            callback_uri,
            web_url,
        }
    }

    /// Build the provider authorization URL the client is redirected to
    pub fn begin_login(&self) -> Result<String, ApiError> {
        if !self.provider.is_configured() {
            error!("Google client id or client secret not configured");
            return Err(ApiError::InternalServer(
                "client_id or client_secret not found to create URL for Google login.".to_string(),
            ));
        }

        let auth_url = self.provider.authorization_url(&self.callback_uri)?;
        info!("Success to generate login url and redirect.");
        Ok(auth_url)
    }

    /// Process the provider callback: exchange the code, resolve the user,
    /// issue a token. Returns the client-application redirect URL carrying
    /// the token as `key_token`.
    pub async fn complete_login(&self, code: Option<&str>) -> Result<String, ApiError> {
        let code = code.ok_or_else(|| {
            warn!("Google callback received without an authorization code");
            ApiError::BadRequest("Google login failed.".to_string())
        })?;

        // Single round trip, never retried: the code is consumed on first use
        let access_token = self.provider.exchange_code(code, &self.callback_uri).await?;
        info!("Success to retrieve access token from Google API.");

        let profile = self.provider.fetch_profile(&access_token).await?;

        if !profile.verified_email {
            warn!(
                email = %safe_email_log(&profile.email),
                "Rejected login with unverified email"
            );
            return Err(ApiError::EmailNotVerified);
        }

        let user_id = self.resolve_user(&profile.name, &profile.email).await?;

        let issued = self
            .codec
            .issue(&user_id)
            .map_err(|_| ApiError::InternalServer("token issuance failed".to_string()))?;

        // Audit persistence is best-effort: a failed record must not cost
        // the user their login
        if let Err(e) = self
            .tokens
            .record(&user_id, &issued.value, issued.issued_at, issued.expires_at)
            .await
        {
            error!(error = %e, user_id = %user_id, "Failed to record issued token");
        }

        info!(user_id = %user_id, "User authentication successful via Google OAuth");

        Ok(format!(
            "{}/callback?key_token={}",
            self.web_url.trim_end_matches('/'),
            urlencoding::encode(&issued.value)
        ))
    }

    /// Find-or-create by email. Two concurrent first-logins may race on the
    /// insert; the loser re-resolves via the unique email key.
    async fn resolve_user(&self, username: &str, email: &str) -> Result<String, ApiError> {
        if let Some(user) = self.users.find_by_email(email).await? {
            return Ok(user.id);
        }

        match self.users.create_user(username, email).await {
            Ok(id) => Ok(id),
            Err(StoreError::DuplicateEmail) => {
                let user = self
                    .users
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| ApiError::InternalServer("user resolution failed".to_string()))?;
                Ok(user.id)
            }
            Err(e) => Err(e.into()),
        }
    }
}
