//! Timeline handlers

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{CreatePostRequest, ListPostsQuery, TimelinePost};
use crate::auth::AuthedUser;
use crate::common::{generate_post_id, ApiError, AppState};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// POST /api/timeline - Create a timeline post as the authenticated user
pub async fn create_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    AuthedUser(user): AuthedUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    let state = state_lock.read().await.clone();
    let id = generate_post_id();

    sqlx::query("INSERT INTO timeline_posts (id, user_id, content, image_url) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&user.id)
        .bind(&request.content)
        .bind(request.image_url.as_deref())
        .execute(&state.db)
        .await?;

    let post = sqlx::query_as::<_, TimelinePost>("SELECT * FROM timeline_posts WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    info!(post_id = %id, user_id = %user.id, "Created timeline post");

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/timeline?limit=&offset= - List posts, newest first
pub async fn list_posts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let posts = sqlx::query_as::<_, TimelinePost>(
        "SELECT * FROM timeline_posts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(posts))
}
