use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    pagination::Page,
    posts::{AuthorResponse, PostResponse},
};

pub mod handler;

/// Database model for a follow relationship: `user` subscribes to `author`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Context of a profile page
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author: AuthorResponse,
    pub author_posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    /// Whether the current viewer follows this author
    pub following: bool,
    pub page_obj: Page<PostResponse>,
}

/// Context of the personal feed page
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub title: String,
    pub page_obj: Page<PostResponse>,
}
