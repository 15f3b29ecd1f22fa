use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use validator::Validate;

use crate::{
    auth::jwt::AuthUser,
    comments::{CommentForm, NewComment},
    error::AppError,
    posts::{handler::load_post, post_detail_url},
    store::{DynStore, Store},
};

/// Add a comment to a post
/// POST /posts/:post_id/comment/
///
/// Always lands back on the post; an invalid or missing body simply adds nothing.
pub async fn add_comment(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    payload: Option<Json<CommentForm>>,
) -> Result<Redirect, AppError> {
    let post = load_post(&*store, &post_id).await?;

    let form = payload.map(|Json(form)| form).unwrap_or_default();

    if form.validate().is_ok() {
        let comment = store
            .create_comment(NewComment {
                post_id: post.id,
                author_id: user.id,
                text: form.text.trim().to_string(),
            })
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "comment added");
    }

    Ok(Redirect::to(&post_detail_url(post.id)))
}
