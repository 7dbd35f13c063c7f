// src/auth/store.rs
//! Persistence for user identities and issued tokens.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use super::models::User;
use crate::common::{email_domain, generate_token_id, generate_user_id};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrent first-login created the same email first; callers should
    /// re-resolve by email instead of surfacing an error
    #[error("a user with this email already exists")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Looks up and creates user identity records
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Insert a new user, returning its id. The email UNIQUE constraint
    /// turns a raced duplicate insert into `StoreError::DuplicateEmail`.
    pub async fn create_user(&self, username: &str, email: &str) -> Result<String, StoreError> {
        let id = generate_user_id();

        sqlx::query("INSERT INTO users (id, username, email) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(username)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .map_or(false, |db| db.is_unique_violation())
                {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Database(e)
                }
            })?;

        info!(
            user_id = %id,
            email_domain = email_domain(email).unwrap_or("unknown"),
            "Created new user"
        );

        Ok(id)
    }
}

/// Records issued tokens for traceability. Observational only: callers treat
/// failures here as non-fatal for the login flow.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: &str,
        token: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let id = generate_token_id();

        sqlx::query(
            "INSERT INTO tokens (id, user_id, token, issued_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(token)
        .bind(issued_at.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(token_id = %id, user_id = %user_id, "Recorded issued token");
        Ok(())
    }
}
