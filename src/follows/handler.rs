use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};

use crate::{
    auth::{jwt::AuthUser, User},
    error::AppError,
    follows::{FeedResponse, ProfileResponse},
    pagination::PageQuery,
    posts::{profile_url, query, AuthorResponse},
    response::ApiResponse,
    store::{DynStore, Store},
};

pub const FEED_TITLE: &str = "Latest updates from your subscriptions";

async fn find_author(store: &dyn Store, username: &str) -> Result<User, AppError> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Get an author's profile with their posts
/// GET /profile/:username/
pub async fn profile(
    State(store): State<DynStore>,
    viewer: Option<AuthUser>,
    Path(username): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = viewer.map(|AuthUser(user)| user);
    let listing =
        query::list_profile_posts(&*store, &username, viewer.as_ref(), page.page.as_deref())
            .await?;

    let followers_count = store.followers_count(listing.author.id).await?;
    let following_count = store.following_count(listing.author.id).await?;

    Ok(ApiResponse::success(ProfileResponse {
        author: AuthorResponse {
            id: listing.author.id,
            username: listing.author.username,
        },
        author_posts_count: listing.post_count,
        followers_count,
        following_count,
        following: listing.following,
        page_obj: listing.posts,
    }))
}

/// Get personalized feed (posts from followed authors)
/// GET /follow/
pub async fn follow_index(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page_obj = query::list_feed_posts(&*store, &user, page.page.as_deref()).await?;

    Ok(ApiResponse::success(FeedResponse {
        title: FEED_TITLE.to_string(),
        page_obj,
    }))
}

/// Follow an author
/// POST /profile/:username/follow/
pub async fn profile_follow(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author = find_author(&*store, &username).await?;

    // Following yourself is silently ignored
    if author.id != user.id && store.follow(user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "followed");
    }

    Ok(Redirect::to(&profile_url(&author.username)))
}

/// Unfollow an author
/// POST /profile/:username/unfollow/
pub async fn profile_unfollow(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author = find_author(&*store, &username).await?;

    if store.unfollow(user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "unfollowed");
    }

    Ok(Redirect::to(&profile_url(&author.username)))
}
