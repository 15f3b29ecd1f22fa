use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{jwt::AuthUser, User},
    cache::PageCache,
    comments::{CommentForm, CommentResponse},
    error::AppError,
    forms::{add_error, field_errors, FormErrors},
    pagination::PageQuery,
    posts::{
        post_detail_url, profile_url, query, IndexResponse, NewPost, PostChanges,
        PostDetailResponse, PostForm, PostFormResponse, PostResponse, PostRow,
    },
    response::{ApiResponse, RawJson},
    store::{DynStore, PostFilter, Store},
};

pub const INDEX_TITLE: &str = "Latest updates on the site";
const INDEX_ROUTE: &str = "/";

/// Malformed ids are reported exactly like unknown ones.
pub(crate) async fn load_post(store: &dyn Store, raw_id: &str) -> Result<PostRow, AppError> {
    let not_found = || AppError::NotFound("Post not found".to_string());
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    store.find_post(id).await?.ok_or_else(not_found)
}

/// Only the author may change a post; anyone else is sent back to it.
pub fn ensure_author(user: &User, post: &PostRow) -> Result<(), AppError> {
    if post.author_id != user.id {
        return Err(AppError::Forbidden {
            redirect_to: post_detail_url(post.id),
        });
    }
    Ok(())
}

const INVALID_GROUP_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field errors of a submitted post form together with the group it resolves to.
/// An unparsable or unknown group is a field error, like blank text.
async fn validate_post_form(
    store: &dyn Store,
    form: &PostForm,
) -> Result<(FormErrors, Option<Uuid>), AppError> {
    let mut errors = match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => field_errors(&e),
    };

    let choice = form
        .group
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    let mut group_id = None;
    if let Some(raw) = choice {
        let known = match Uuid::parse_str(raw) {
            Ok(id) => store.find_group_by_id(id).await?.map(|group| group.id),
            Err(_) => None,
        };
        if known.is_none() {
            add_error(&mut errors, "group", INVALID_GROUP_CHOICE);
        }
        group_id = known;
    }

    Ok((errors, group_id))
}

fn cleaned_image(form: &PostForm) -> Option<String> {
    form.image
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}

async fn render_form(
    store: &dyn Store,
    form: PostForm,
    errors: FormErrors,
    is_edit: bool,
) -> Result<ApiResponse<PostFormResponse>, AppError> {
    let groups = store.list_groups().await?;
    Ok(ApiResponse::success(PostFormResponse {
        form,
        errors,
        groups,
        is_edit,
    }))
}

/// GET /
pub async fn index(
    State(store): State<DynStore>,
    State(cache): State<Arc<PageCache>>,
    Query(page): Query<PageQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let key = PageCache::key(INDEX_ROUTE, raw_query.as_deref());

    let body = cache
        .get_or_render(key, || async {
            let page_obj = query::list_all_posts(&*store, page.page.as_deref()).await?;
            ApiResponse::success(IndexResponse {
                title: INDEX_TITLE.to_string(),
                index: true,
                page_obj,
            })
            .to_bytes()
        })
        .await?;

    Ok(RawJson(body))
}

/// GET /posts/:post_id/
pub async fn post_detail(
    State(store): State<DynStore>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = load_post(&*store, &post_id).await?;

    let author_posts_count = store
        .count_posts(PostFilter::Author(post.author_id))
        .await?;
    let comments = store
        .list_comments(post.id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(ApiResponse::success(PostDetailResponse {
        post: PostResponse::from(post),
        author_posts_count,
        comments,
        form: CommentForm::default(),
    }))
}

/// GET /create/
pub async fn post_create_form(
    State(store): State<DynStore>,
    AuthUser(_user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    render_form(&*store, PostForm::default(), FormErrors::new(), false).await
}

/// POST /create/
pub async fn post_create(
    State(store): State<DynStore>,
    State(cache): State<Arc<PageCache>>,
    AuthUser(user): AuthUser,
    Json(form): Json<PostForm>,
) -> Result<Response, AppError> {
    let (errors, group_id) = validate_post_form(&*store, &form).await?;
    if !errors.is_empty() {
        return Ok(render_form(&*store, form, errors, false)
            .await?
            .into_response());
    }

    let post = store
        .create_post(NewPost {
            author_id: user.id,
            text: form.text.trim().to_string(),
            group_id,
            image: cleaned_image(&form),
        })
        .await?;

    tracing::info!(post_id = %post.id, author = %user.username, preview = %post, "post created");
    cache.invalidate_route(INDEX_ROUTE);

    Ok(Redirect::to(&profile_url(&user.username)).into_response())
}

/// GET /posts/:post_id/edit/
pub async fn post_edit_form(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = load_post(&*store, &post_id).await?;
    ensure_author(&user, &post)?;

    render_form(&*store, PostForm::from(&post), FormErrors::new(), true).await
}

/// POST /posts/:post_id/edit/
pub async fn post_edit(
    State(store): State<DynStore>,
    State(cache): State<Arc<PageCache>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Json(form): Json<PostForm>,
) -> Result<Response, AppError> {
    let post = load_post(&*store, &post_id).await?;
    ensure_author(&user, &post)?;

    let (errors, group_id) = validate_post_form(&*store, &form).await?;
    if !errors.is_empty() {
        return Ok(render_form(&*store, form, errors, true)
            .await?
            .into_response());
    }

    let image = cleaned_image(&form);
    store
        .update_post(
            post.id,
            PostChanges {
                text: form.text.trim().to_string(),
                group_id,
                image,
            },
        )
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    tracing::info!(post_id = %post.id, "post edited");
    cache.invalidate_route(INDEX_ROUTE);

    Ok(Redirect::to(&post_detail_url(post.id)).into_response())
}

/// POST /posts/:post_id/delete/
pub async fn post_delete(
    State(store): State<DynStore>,
    State(cache): State<Arc<PageCache>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = load_post(&*store, &post_id).await?;
    ensure_author(&user, &post)?;

    store.delete_post(post.id).await?;

    tracing::info!(post_id = %post.id, "post deleted");
    cache.invalidate_route(INDEX_ROUTE);

    Ok(Redirect::to(&profile_url(&user.username)))
}
