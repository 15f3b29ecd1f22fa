use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{pagination::Page, posts::PostResponse};

pub mod handler;

/// Database model for a community posts can be filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Request payload for creating a group
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroup {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    /// Derived from the title when omitted.
    #[validate(length(max = 200, message = "Slug must be at most 200 characters"))]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Context of a group page
#[derive(Debug, Serialize)]
pub struct GroupPageResponse {
    pub title: String,
    pub group: Group,
    pub page_obj: Page<PostResponse>,
}
