use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{NewUser, User},
    comments::{Comment, CommentRow, NewComment},
    groups::{Group, NewGroup},
    posts::{NewPost, Post, PostChanges, PostRow},
    store::{PostFilter, Store, StoreError, StoreResult},
};

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.text, p.image, p.created_at,
        p.author_id, u.username AS author_username,
        p.group_id, g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON p.author_id = u.id
    LEFT JOIN groups g ON p.group_id = g.id
"#;

/// Newest first, later inserts first among equal timestamps, so LIMIT/OFFSET
/// pages never overlap or skip rows.
fn list_posts_sql(where_clause: &str, filtered: bool) -> String {
    let (limit_param, offset_param) = if filtered { (2, 3) } else { (1, 2) };
    format!(
        "{} {} ORDER BY p.created_at DESC, p.seq DESC LIMIT ${} OFFSET ${}",
        POST_SELECT, where_clause, limit_param, offset_param
    )
}

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps unique-constraint violations to `StoreError::Conflict`.
fn conflict_or(e: sqlx::Error, message: &str) -> StoreError {
    let unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        StoreError::Conflict(message.to_string())
    } else {
        StoreError::Database(e)
    }
}

/// WHERE clause for a listing plus the id bound to `$1`, if any.
fn filter_clause(filter: PostFilter) -> (&'static str, Option<Uuid>) {
    match filter {
        PostFilter::All => ("", None),
        PostFilter::Group(id) => ("WHERE p.group_id = $1", Some(id)),
        PostFilter::Author(id) => ("WHERE p.author_id = $1", Some(id)),
        PostFilter::FollowedBy(id) => (
            "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)",
            Some(id),
        ),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Username or Email already exists"))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_group(&self, group: NewGroup) -> StoreResult<Group> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (id, title, slug, description) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "Group slug already exists"))
    }

    async fn find_group_by_id(&self, id: Uuid) -> StoreResult<Option<Group>> {
        Ok(sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_group_by_slug(&self, slug: &str) -> StoreResult<Option<Group>> {
        Ok(sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        Ok(
            sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY title ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn delete_group(&self, id: Uuid) -> StoreResult<bool> {
        // posts.group_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<Post> {
        Ok(sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, author_id, text, group_id, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.author_id)
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<PostRow>> {
        let query = format!("{} WHERE p.id = $1", POST_SELECT);
        Ok(sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>> {
        Ok(sqlx::query_as::<_, Post>(
            "UPDATE posts SET text = $1, group_id = $2, image = $3 WHERE id = $4 RETURNING *",
        )
        .bind(&changes.text)
        .bind(changes.group_id)
        .bind(&changes.image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_posts(&self, filter: PostFilter) -> StoreResult<i64> {
        let (where_clause, id) = filter_clause(filter);
        let query = format!("SELECT COUNT(*) FROM posts p {}", where_clause);

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(id) = id {
            q = q.bind(id);
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PostRow>> {
        let (where_clause, id) = filter_clause(filter);
        let query = list_posts_sql(where_clause, id.is_some());

        let mut q = sqlx::query_as::<_, PostRow>(&query);
        if let Some(id) = id {
            q = q.bind(id);
        }
        Ok(q.bind(limit).bind(offset).fetch_all(&self.pool).await?)
    }

    async fn create_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        Ok(sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<CommentRow>> {
        Ok(sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created_at
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.seq ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn follow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> StoreResult<bool> {
        Ok(
            sqlx::query("SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2")
                .bind(user_id)
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?
                .is_some(),
        )
    }

    async fn followers_count(&self, author_id: Uuid) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn following_count(&self, user_id: Uuid) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}
