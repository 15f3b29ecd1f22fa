use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use slug::slugify;
use validator::Validate;

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    groups::{CreateGroup, GroupPageResponse, NewGroup},
    pagination::PageQuery,
    posts::query,
    response::ApiResponse,
    store::{DynStore, Store},
};

/// GET /group/:slug/
pub async fn group_posts(
    State(store): State<DynStore>,
    Path(slug): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (group, page_obj) = query::list_group_posts(&*store, &slug, page.page.as_deref()).await?;

    Ok(ApiResponse::success(GroupPageResponse {
        title: format!("Posts of the \"{}\" community", group),
        group,
        page_obj,
    }))
}

/// POST /group/
pub async fn create_group(
    State(store): State<DynStore>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateGroup>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slugify(slug),
        _ => slugify(&payload.title),
    };
    if slug.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Group slug cannot be empty".to_string(),
        ));
    }

    let group = store
        .create_group(NewGroup {
            title: payload.title.trim().to_string(),
            slug,
            description: payload.description,
        })
        .await?;

    tracing::info!(slug = %group.slug, created_by = %user.username, "group created");

    Ok(ApiResponse::success_with_message("Group created".to_string(), group).created())
}
