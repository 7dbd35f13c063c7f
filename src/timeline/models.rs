//! Timeline data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Timeline post database model
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct TimelinePost {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
