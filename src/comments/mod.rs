use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::forms::not_blank;

pub mod handler;

/// Database model for a comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

/// A comment joined with its author's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Submitted comment form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: CommentAuthor,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Author info embedded in comment response
#[derive(Debug, Serialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub username: String,
}

impl From<CommentRow> for CommentResponse {
    fn from(c: CommentRow) -> Self {
        CommentResponse {
            id: c.id,
            post_id: c.post_id,
            author: CommentAuthor {
                id: c.author_id,
                username: c.author_username,
            },
            text: c.text,
            created_at: c.created_at,
        }
    }
}
