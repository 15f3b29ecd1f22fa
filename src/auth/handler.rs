use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    auth::{
        jwt::{self, AuthUser},
        utils, AuthResponse, LoginPageQuery, LoginPageResponse, LoginUser, NewUser, RegisterUser,
        UserResponse,
    },
    config::settings::Settings,
    error::AppError,
    response::ApiResponse,
    store::{DynStore, Store},
};

pub async fn signup(
    State(store): State<DynStore>,
    State(settings): State<Settings>,
    Json(payload): Json<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let password_hash =
        utils::hash_password(&payload.password).map_err(|_| AppError::InternalServerError)?;

    let user = store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;

    let token = jwt::create_token(user.id, &settings.jwt_secret)
        .map_err(|_| AppError::InternalServerError)?;

    tracing::info!(username = %user.username, "user signed up");

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
    .created())
}

/// Where protected routes send unauthenticated callers; echoes the return path.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> impl IntoResponse {
    ApiResponse::success(LoginPageResponse {
        next: query.next.unwrap_or_else(|| "/".to_string()),
    })
}

pub async fn login(
    State(store): State<DynStore>,
    State(settings): State<Settings>,
    Json(payload): Json<LoginUser>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let user = store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    utils::verify_password(&user.password_hash, &payload.password)
        .map_err(|_| AppError::Unauthorized)?;

    let token = jwt::create_token(user.id, &settings.jwt_secret)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

pub async fn get_me(AuthUser(user): AuthUser) -> impl IntoResponse {
    ApiResponse::success(UserResponse::from(user))
}
