//! Persistence seam for users, groups, posts, comments and follow edges.
//!
//! Handlers only ever talk to [`Store`]; [`PgStore`] backs the running
//! service and [`MemoryStore`] keeps the same semantics in process for tests
//! and local experiments.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::{NewUser, User},
    comments::{Comment, CommentRow, NewComment},
    groups::{Group, NewGroup},
    posts::{NewPost, Post, PostChanges, PostRow},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn Store>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which posts a listing is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group>;
    async fn find_group_by_id(&self, id: Uuid) -> StoreResult<Option<Group>>;
    async fn find_group_by_slug(&self, slug: &str) -> StoreResult<Option<Group>>;
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;
    /// Removes the group; its posts stay and lose their group reference.
    async fn delete_group(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_post(&self, post: NewPost) -> StoreResult<Post>;
    /// A post with its author and group resolved.
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<PostRow>>;
    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>>;
    /// Removes the post together with its comments.
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;
    async fn count_posts(&self, filter: PostFilter) -> StoreResult<i64>;
    /// Newest first.
    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PostRow>>;

    async fn create_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    /// Oldest first.
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<CommentRow>>;

    /// Get-or-create. Returns whether a new edge was written.
    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool>;
    /// Delete-if-exists. Returns whether an edge was removed.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool>;
    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool>;
    async fn followers_count(&self, author_id: Uuid) -> StoreResult<i64>;
    async fn following_count(&self, user_id: Uuid) -> StoreResult<i64>;
}
