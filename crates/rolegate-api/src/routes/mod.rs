//! HTTP routes

mod actuator;
mod demo;
mod login;
mod logout;

use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
};
use tower_http::services::ServeDir;

use crate::error::ApiError;
use crate::guard;
use crate::session;
use crate::state::AppState;

pub const LOGIN_PAGE_URL: &str = "/login/page";
pub const LOGIN_FAILURE_URL: &str = "/login/page?error";
pub const WELCOME_URL: &str = "/login/welcome";
pub const LOGOUT_RESULT_URL: &str = "/logout/result";

/// `302 Found` redirect
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Create the main router
///
/// Every route, static files and the fallback included, sits behind the
/// authorization middleware, which in turn sits inside the session layer.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(login::routes())
        .merge(logout::routes())
        .merge(demo::routes())
        .merge(actuator::routes());

    if let Some(dir) = &state.settings.static_dir {
        router = router
            .nest_service("/js", ServeDir::new(dir.join("js")))
            .nest_service("/images", ServeDir::new(dir.join("images")));
    }

    let session_layer = session::session_layer(&state.settings);

    router
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::authorize,
        ))
        .with_state(state)
        .layer(session_layer)
}
