use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    comments::{CommentForm, CommentResponse},
    forms::{not_blank, FormErrors},
    groups::Group,
    pagination::Page,
};

pub mod handler;
pub mod query;

/// Database model for a post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(15).collect();
        f.write_str(&preview)
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Editable fields of a post; the author never changes.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// A post joined with its author and group
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub text: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub group_id: Option<Uuid>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

/// Submitted post form, used by both create and edit
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
    /// Raw group choice, echoed back as submitted when the form re-renders.
    pub group: Option<String>,
    #[validate(length(max = 255, message = "Image path must be at most 255 characters"))]
    pub image: Option<String>,
}

impl From<&PostRow> for PostForm {
    fn from(post: &PostRow) -> Self {
        PostForm {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub text: String,
    pub image: Option<String>,
    pub author: AuthorResponse,
    pub group: Option<GroupSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for PostResponse {
    fn from(p: PostRow) -> Self {
        let group = match (p.group_id, p.group_slug, p.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupSummary { id, slug, title }),
            _ => None,
        };

        PostResponse {
            id: p.id,
            text: p.text,
            image: p.image,
            author: AuthorResponse {
                id: p.author_id,
                username: p.author_username,
            },
            group,
            created_at: p.created_at,
        }
    }
}

/// Context of the index page
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub title: String,
    pub index: bool,
    pub page_obj: Page<PostResponse>,
}

/// Context of the post detail page
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub author_posts_count: i64,
    pub comments: Vec<CommentResponse>,
    pub form: CommentForm,
}

/// Context of the create / edit form, fresh or re-rendered with errors
#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub form: PostForm,
    pub errors: FormErrors,
    /// Choices for the `group` field.
    pub groups: Vec<Group>,
    pub is_edit: bool,
}

pub fn post_detail_url(post_id: Uuid) -> String {
    format!("/posts/{}/", post_id)
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", username)
}
