//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::routes::{found, LOGIN_FAILURE_URL, LOGIN_PAGE_URL, LOGOUT_RESULT_URL};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid CSRF token")]
    InvalidCsrfToken,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Auth error: {0}")]
    Auth(#[from] rolegate_auth::AuthError),

    #[error("Remember-me error: {0}")]
    RememberMe(#[from] rolegate_auth::RememberMeError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthenticated => return found(LOGIN_PAGE_URL),
            ApiError::SessionExpired => return found(LOGOUT_RESULT_URL),
            ApiError::Auth(e) if e.is_credential_failure() => return found(LOGIN_FAILURE_URL),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden".to_string()),
            ApiError::InvalidCsrfToken => (
                StatusCode::FORBIDDEN,
                "INVALID_CSRF_TOKEN",
                "Invalid CSRF token".to_string(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string()),
            ApiError::Internal(_)
            | ApiError::Auth(_)
            | ApiError::RememberMe(_)
            | ApiError::Session(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
