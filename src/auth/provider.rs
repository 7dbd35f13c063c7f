// src/auth/provider.rs
//! OAuth2 authorization-code client for the external identity provider.
//!
//! The provider is expressed as a trait so the orchestrator can be exercised
//! against a stand-in in tests and an alternate provider can be dropped in
//! without touching the login flow.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::common::email_domain;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OAuth client credentials are not configured")]
    NotConfigured,

    #[error("authorization code exchange failed: {0}")]
    CodeExchangeFailed(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("provider returned a malformed profile: {0}")]
    MalformedProfile(String),
}

/// Profile fields fetched from the provider per login. Transient; only
/// projected into a user row on first login.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub email: String,
    pub name: String,
    pub verified_email: bool,
}

/// The three OAuth2 authorization-code operations the login flow needs
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether both client id and secret are present. Checked before a login
    /// is even started so a half-configured deployment fails as an operator
    /// error rather than partway through the flow.
    fn is_configured(&self) -> bool;

    /// Deterministic authorization URL the user agent is redirected to
    fn authorization_url(&self, redirect_uri: &str) -> Result<String, ProviderError>;

    /// Exchange a single-use authorization code for an access token.
    /// One round trip, never retried: the code is consumed by the provider
    /// on first use and a retry would legitimately fail.
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<String, ProviderError>;

    /// Fetch the profile bound to an access token
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, ProviderError>;
}

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: String,
    #[serde(default)]
    verified_email: bool,
    #[serde(default)]
    name: Option<String>,
}

/// Google implementation of the authorization-code flow
#[derive(Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GoogleProvider {
    pub fn new(client: Client, client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client,
            client_id,
            client_secret,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), ProviderError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(ProviderError::NotConfigured),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    fn authorization_url(&self, redirect_uri: &str) -> Result<String, ProviderError> {
        let client_id = self.client_id.as_deref().ok_or(ProviderError::NotConfigured)?;

        let scopes = "openid email profile";
        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(scopes)
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, ProviderError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for access token");

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::CodeExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(ProviderError::CodeExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::CodeExchangeFailed(e.to_string()))?;

        Ok(token_response.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, ProviderError> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::ProfileFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Userinfo request failed");
            return Err(ProviderError::ProfileFetchFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let info = response
            .json::<UserInfoResponse>()
            .await
            .map_err(|e| ProviderError::ProfileFetchFailed(e.to_string()))?;

        // An address without exactly one '@' cannot be used as a lookup key
        if email_domain(&info.email).is_none() {
            return Err(ProviderError::MalformedProfile(
                "email field is not a valid address".to_string(),
            ));
        }

        let name = info.name.unwrap_or_else(|| info.email.clone());

        Ok(ProviderProfile {
            email: info.email,
            name,
            verified_email: info.verified_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_contains_credentials() {
        let provider = GoogleProvider::new(
            Client::new(),
            Some("test_client_id".to_string()),
            Some("test_secret".to_string()),
        );

        let auth_url = provider
            .authorization_url("http://localhost:8080/auth/google/callback")
            .unwrap();

        assert!(auth_url.starts_with(GOOGLE_AUTH_URL));
        assert!(auth_url.contains("client_id=test_client_id"));
        assert!(auth_url.contains("redirect_uri=http"));
        assert!(auth_url.contains("response_type=code"));
        assert!(auth_url.contains("scope="));
    }

    #[test]
    fn test_authorization_url_without_client_id() {
        let provider = GoogleProvider::new(Client::new(), None, Some("secret".to_string()));

        let err = provider
            .authorization_url("http://localhost:8080/auth/google/callback")
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured));
    }

    #[tokio::test]
    async fn test_exchange_code_without_credentials() {
        let provider = GoogleProvider::new(Client::new(), Some("id".to_string()), None);

        let err = provider
            .exchange_code("some-code", "http://localhost:8080/auth/google/callback")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured));
    }
}
