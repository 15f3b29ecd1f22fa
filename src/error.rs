use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::json;

use crate::store::StoreError;

pub const LOGIN_URL: &str = "/auth/login/";

/// Characters left as-is in the `next` parameter; `?`, `&` and `=` are encoded
const NEXT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug)]
pub enum AppError {
    InternalServerError,
    /// Bad credentials on sign-in.
    Unauthorized,
    /// No valid session on a protected route. Carries the path to return to.
    Unauthenticated { next: String },
    /// The caller may not act on the resource; they are sent elsewhere
    /// instead of seeing an error.
    Forbidden { redirect_to: String },
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
}

impl AppError {
    pub fn login_redirect_url(next: &str) -> String {
        format!("{}?next={}", LOGIN_URL, utf8_percent_encode(next, NEXT_SET))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                AppError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthenticated { next } => {
                return Redirect::to(&AppError::login_redirect_url(&next)).into_response();
            }
            AppError::Forbidden { redirect_to } => {
                return Redirect::to(&redirect_to).into_response();
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        // Standardized failure response matching ApiResponse structure
        let body = Json(json!({
            "success": false,
            "message": error_message,
            "data": null
        }));

        (status, body).into_response()
    }
}
