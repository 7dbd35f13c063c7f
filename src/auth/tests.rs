//! Tests for the auth module
//!
//! These tests drive the full login orchestration against a stand-in
//! identity provider and an in-memory database, and cover bearer
//! authentication end to end.

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::extractors::authenticate;
use super::provider::{IdentityProvider, ProviderError, ProviderProfile};
use super::service::AuthService;
use super::store::{TokenStore, UserStore};
use super::token::TokenCodec;
use crate::common::ApiError;

const CALLBACK_URI: &str = "http://localhost:8080/auth/google/callback";
const WEB_URL: &str = "http://localhost:3000";

struct MockProvider {
    configured: bool,
    fail_exchange: bool,
    malformed_profile: bool,
    profile: ProviderProfile,
}

impl MockProvider {
    fn verified(email: &str, name: &str) -> Self {
        Self {
            configured: true,
            fail_exchange: false,
            malformed_profile: false,
            profile: ProviderProfile {
                email: email.to_string(),
                name: name.to_string(),
                verified_email: true,
            },
        }
    }

    fn unverified(email: &str) -> Self {
        let mut provider = Self::verified(email, "Someone");
        provider.profile.verified_email = false;
        provider
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn authorization_url(&self, redirect_uri: &str) -> Result<String, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured);
        }
        Ok(format!(
            "https://provider.example/auth?client_id=mock&redirect_uri={}",
            redirect_uri
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<String, ProviderError> {
        if self.fail_exchange {
            return Err(ProviderError::CodeExchangeFailed("HTTP 400".to_string()));
        }
        Ok(format!("access-token-for-{}", code))
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<ProviderProfile, ProviderError> {
        if self.malformed_profile {
            return Err(ProviderError::MalformedProfile(
                "email field is not a valid address".to_string(),
            ));
        }
        Ok(self.profile.clone())
    }
}

async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    crate::common::migrations::run_migrations(&pool).await.unwrap();

    pool
}

fn codec() -> TokenCodec {
    TokenCodec::new("test_secret_key".to_string(), Algorithm::HS256, 24)
}

fn service(pool: &SqlitePool, provider: MockProvider) -> AuthService {
    AuthService::new(
        Arc::new(provider),
        UserStore::new(pool.clone()),
        TokenStore::new(pool.clone()),
        codec(),
        CALLBACK_URI.to_string(),
        WEB_URL.to_string(),
    )
}

fn key_token(redirect_url: &str) -> String {
    let raw = redirect_url
        .split("key_token=")
        .nth(1)
        .expect("redirect carries key_token");
    urlencoding::decode(raw).unwrap().into_owned()
}

async fn user_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

async fn token_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tokens")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_begin_login_builds_authorization_url() {
    let pool = setup_test_db().await;
    let svc = service(&pool, MockProvider::verified("a@example.com", "A"));

    let url = svc.begin_login().unwrap();
    assert!(url.contains("client_id=mock"));
    assert!(url.contains(CALLBACK_URI));
}

#[tokio::test]
async fn test_begin_login_without_credentials_is_server_error() {
    let pool = setup_test_db().await;
    let mut provider = MockProvider::verified("a@example.com", "A");
    provider.configured = false;
    let svc = service(&pool, provider);

    let err = svc.begin_login().unwrap_err();
    assert!(matches!(err, ApiError::InternalServer(_)));
}

#[tokio::test]
async fn test_complete_login_without_code_is_bad_request() {
    let pool = setup_test_db().await;
    let svc = service(&pool, MockProvider::verified("a@example.com", "A"));

    let err = svc.complete_login(None).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(user_count(&pool).await, 0);
}

#[tokio::test]
async fn test_complete_login_exchange_failure_is_bad_request() {
    let pool = setup_test_db().await;
    let mut provider = MockProvider::verified("a@example.com", "A");
    provider.fail_exchange = true;
    let svc = service(&pool, provider);

    let err = svc.complete_login(Some("used-code")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(user_count(&pool).await, 0);
}

#[tokio::test]
async fn test_complete_login_issues_token_for_new_user() {
    let pool = setup_test_db().await;
    let svc = service(&pool, MockProvider::verified("new@example.com", "New User"));

    let redirect = svc.complete_login(Some("code-1")).await.unwrap();
    assert!(redirect.starts_with(&format!("{}/callback?key_token=", WEB_URL)));

    // The embedded token parses back to the created user
    let subject = codec().parse(&key_token(&redirect)).unwrap();
    let user = UserStore::new(pool.clone())
        .find_by_id(&subject)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email, "new@example.com");
    assert_eq!(user.username, "New User");

    assert_eq!(token_count(&pool).await, 1);
}

#[tokio::test]
async fn test_repeat_login_resolves_same_user() {
    let pool = setup_test_db().await;
    let svc = service(&pool, MockProvider::verified("same@example.com", "Same"));

    let first = svc.complete_login(Some("code-1")).await.unwrap();
    let second = svc.complete_login(Some("code-2")).await.unwrap();

    let subject_one = codec().parse(&key_token(&first)).unwrap();
    let subject_two = codec().parse(&key_token(&second)).unwrap();

    assert_eq!(subject_one, subject_two);
    assert_eq!(user_count(&pool).await, 1);
    // Both tokens stay live; issuing a second does not displace the first
    assert_eq!(token_count(&pool).await, 2);
}

#[tokio::test]
async fn test_malformed_profile_is_bad_request() {
    let pool = setup_test_db().await;
    let mut provider = MockProvider::verified("a@example.com", "A");
    provider.malformed_profile = true;
    let svc = service(&pool, provider);

    let err = svc.complete_login(Some("code-1")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(user_count(&pool).await, 0);
    assert_eq!(token_count(&pool).await, 0);
}

#[tokio::test]
async fn test_unverified_email_has_no_side_effects() {
    let pool = setup_test_db().await;
    let svc = service(&pool, MockProvider::unverified("shady@example.com"));

    let err = svc.complete_login(Some("code-1")).await.unwrap_err();
    assert!(matches!(err, ApiError::EmailNotVerified));
    assert_eq!(user_count(&pool).await, 0);
    assert_eq!(token_count(&pool).await, 0);
}

#[tokio::test]
async fn test_authenticate_accepts_prefixed_and_bare_tokens() {
    let pool = setup_test_db().await;
    let users = UserStore::new(pool.clone());
    let codec = codec();

    let user_id = users.create_user("Auth User", "auth@example.com").await.unwrap();
    let issued = codec.issue(&user_id).unwrap();

    let with_prefix = authenticate(&codec, &users, Some(&format!("Bearer {}", issued.value)))
        .await
        .unwrap();
    let bare = authenticate(&codec, &users, Some(&issued.value))
        .await
        .unwrap();

    assert_eq!(with_prefix.id, user_id);
    assert_eq!(bare.id, user_id);
}

#[tokio::test]
async fn test_authenticate_without_header_is_bad_request() {
    let pool = setup_test_db().await;
    let users = UserStore::new(pool.clone());

    let err = authenticate(&codec(), &users, None).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingCredential));
}

#[tokio::test]
async fn test_authenticate_expired_token_is_unauthorized() {
    let pool = setup_test_db().await;
    let users = UserStore::new(pool.clone());

    let user_id = users.create_user("Auth User", "auth@example.com").await.unwrap();
    let stale = TokenCodec::new("test_secret_key".to_string(), Algorithm::HS256, -1)
        .issue(&user_id)
        .unwrap();

    let err = authenticate(&codec(), &users, Some(&format!("Bearer {}", stale.value)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TokenExpired));
}

#[tokio::test]
async fn test_authenticate_tampered_token_is_unauthorized() {
    let pool = setup_test_db().await;
    let users = UserStore::new(pool.clone());

    let err = authenticate(&codec(), &users, Some("Bearer not.a.token"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TokenInvalid));
}

#[tokio::test]
async fn test_authenticate_unknown_subject_is_not_found() {
    let pool = setup_test_db().await;
    let users = UserStore::new(pool.clone());
    let codec = codec();

    // Well-formed token whose subject never existed (or was since deleted)
    let issued = codec.issue("U_G0NE00").unwrap();

    let err = authenticate(&codec, &users, Some(&format!("Bearer {}", issued.value)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UserNotFound));
}
