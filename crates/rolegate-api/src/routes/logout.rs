//! Logout routes

use axum::{
    Form, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use std::collections::HashMap;
use tower_sessions::Session;
use tracing::info;

use super::{LOGOUT_RESULT_URL, found};
use crate::cookies;
use crate::csrf::{self, CSRF_FIELD};
use crate::error::ApiError;
use crate::guard::CurrentUser;
use crate::pages;
use crate::state::AppState;

/// GET /logout/page
async fn logout_page(
    State(state): State<AppState>,
    session: Session,
    _user: CurrentUser,
) -> Result<Html<String>, ApiError> {
    let token = csrf::token(&state, &session).await?;
    Ok(pages::logout(token.as_deref()))
}

/// POST /logout/page
async fn perform_logout(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(principal): CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    csrf::verify(&state, &session, form.get(CSRF_FIELD).map(String::as_str)).await?;

    let removed = state.remember_me.invalidate_user(&principal.username).await?;
    session.flush().await?;
    info!(
        "User {} logged out ({} remember-me tokens removed)",
        principal.username, removed
    );

    let mut response = found(LOGOUT_RESULT_URL);
    if let Some(value) = cookies::clear_remember_me(&state.settings) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}

/// GET /logout/result
async fn logout_result() -> impl IntoResponse {
    pages::logout_result()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logout/page", get(logout_page).post(perform_logout))
        .route("/logout/result", get(logout_result))
}
