// src/common/config.rs
//! Application configuration loaded once at startup.
//!
//! Every component receives its settings from this struct instead of reading
//! environment variables at call time.

use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Process-wide configuration, built from the environment in `main`
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Google OAuth client id. Absence is tolerated at startup and surfaces
    /// as a 500 when a login is attempted.
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    /// Secret used to sign issued JWTs
    pub token_secret_key: String,
    pub token_algorithm: Algorithm,
    pub token_ttl_hours: i64,
    /// Base URL this server is reachable at; the OAuth redirect URI is
    /// derived from it
    pub redirect_base_url: String,
    /// Base URL of the client web application that receives the issued token
    pub web_url: String,
    pub cors_origins: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let token_algorithm = env::var("TOKEN_ALGORITHM")
            .ok()
            .and_then(|raw| match Algorithm::from_str(&raw) {
                Ok(alg) => Some(alg),
                Err(_) => {
                    warn!(algorithm = %raw, "Unknown TOKEN_ALGORITHM, falling back to HS256");
                    None
                }
            })
            .unwrap_or(Algorithm::HS256);

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://timeline_api.db".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            token_secret_key: env::var("TOKEN_SECRET_KEY")
                .unwrap_or_else(|_| "replace_with_strong_secret".to_string()),
            token_algorithm,
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse::<i64>().ok())
                .unwrap_or(24),
            redirect_base_url: env::var("REDIRECT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            web_url: env::var("WEB_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
        }
    }

    /// Redirect URI registered with the provider; must match between the
    /// authorization request and the code exchange
    pub fn callback_uri(&self) -> String {
        format!(
            "{}/auth/google/callback",
            self.redirect_base_url.trim_end_matches('/')
        )
    }
}
