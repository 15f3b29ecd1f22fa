//! Which posts each listing shows, and in which page.

use crate::{
    auth::User,
    error::AppError,
    groups::Group,
    pagination::{Page, Paginator},
    posts::PostResponse,
    store::{PostFilter, Store},
};

/// Posts of one profile together with what the page says about the author.
pub struct ProfileListing {
    pub author: User,
    pub posts: Page<PostResponse>,
    pub post_count: i64,
    pub following: bool,
}

async fn paginate(
    store: &dyn Store,
    filter: PostFilter,
    page: Option<&str>,
) -> Result<Page<PostResponse>, AppError> {
    let count = store.count_posts(filter).await?;
    let window = Paginator::default().window(count, page);

    let rows = store
        .list_posts(filter, window.limit, window.offset)
        .await?;
    let items = rows.into_iter().map(PostResponse::from).collect();

    Ok(Page::new(items, window, count))
}

pub async fn list_all_posts(
    store: &dyn Store,
    page: Option<&str>,
) -> Result<Page<PostResponse>, AppError> {
    paginate(store, PostFilter::All, page).await
}

pub async fn list_group_posts(
    store: &dyn Store,
    slug: &str,
    page: Option<&str>,
) -> Result<(Group, Page<PostResponse>), AppError> {
    let group = store
        .find_group_by_slug(slug)
        .await?
        .ok_or(AppError::NotFound("Group not found".to_string()))?;

    let posts = paginate(store, PostFilter::Group(group.id), page).await?;
    Ok((group, posts))
}

pub async fn list_profile_posts(
    store: &dyn Store,
    username: &str,
    viewer: Option<&User>,
    page: Option<&str>,
) -> Result<ProfileListing, AppError> {
    let author = store
        .find_user_by_username(username)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let posts = paginate(store, PostFilter::Author(author.id), page).await?;

    let following = match viewer {
        Some(viewer) => store.is_following(viewer.id, author.id).await?,
        None => false,
    };

    Ok(ProfileListing {
        post_count: posts.count,
        author,
        posts,
        following,
    })
}

pub async fn list_feed_posts(
    store: &dyn Store,
    viewer: &User,
    page: Option<&str>,
) -> Result<Page<PostResponse>, AppError> {
    paginate(store, PostFilter::FollowedBy(viewer.id), page).await
}
