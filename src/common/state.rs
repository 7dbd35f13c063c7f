// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::{AuthService, TokenCodec};

/// Application state containing database pool and services
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub token_codec: TokenCodec,
    pub auth_service: Arc<AuthService>,
}
