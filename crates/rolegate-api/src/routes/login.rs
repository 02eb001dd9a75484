//! Login routes

use axum::{
    Form, Router,
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rolegate_auth::AuthError;
use std::collections::HashMap;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use super::{WELCOME_URL, found};
use crate::cookies;
use crate::csrf::{self, CSRF_FIELD};
use crate::error::ApiError;
use crate::guard::CurrentUser;
use crate::pages;
use crate::session;
use crate::state::AppState;

const MAX_USERNAME_LEN: usize = 256;
const MAX_PASSWORD_LEN: usize = 1024;

/// Whether a checkbox-style form value asks for remember-me
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "yes" | "true" | "1"
    )
}

/// GET /login/page
async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let token = csrf::token(&state, &session).await?;
    Ok(pages::login(
        query.contains_key("error"),
        &state.settings.remember_me_parameter,
        token.as_deref(),
    ))
}

/// POST /login/account
async fn login_account(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    csrf::verify(&state, &session, form.get(CSRF_FIELD).map(String::as_str)).await?;

    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();
    debug!("Login attempt for user: {}", username);

    if username.is_empty() || username.len() > MAX_USERNAME_LEN || password.len() > MAX_PASSWORD_LEN
    {
        metrics::counter!("rolegate_logins_total", "method" => "form", "outcome" => "failure")
            .increment(1);
        return Err(AuthError::BadSecret.into());
    }

    // Hash verification is CPU bound
    let authenticator = state.authenticator.clone();
    let user = username.clone();
    let outcome = tokio::task::spawn_blocking(move || authenticator.authenticate(&user, &password))
        .await
        .map_err(|e| ApiError::Internal(format!("Login task failed: {}", e)))?;

    let principal = match outcome {
        Ok(principal) => principal,
        Err(e) => {
            if e.is_credential_failure() {
                warn!("Failed login for user {}: {}", username, e);
                metrics::counter!("rolegate_logins_total", "method" => "form", "outcome" => "failure")
                    .increment(1);
            }
            return Err(e.into());
        }
    };

    session::bind_principal(&session, &principal).await?;
    metrics::counter!("rolegate_logins_total", "method" => "form", "outcome" => "success")
        .increment(1);
    info!("User {} logged in", principal.username);

    let remember = form
        .get(&state.settings.remember_me_parameter)
        .is_some_and(|v| is_truthy(v));
    let set_cookie = if remember {
        let token = state.remember_me.issue(&principal.username).await?;
        debug!("Issued remember-me token for {}", principal.username);
        cookies::remember_me(
            &state.settings,
            token.cookie_value(),
            state.remember_me.validity_seconds(),
        )
    } else {
        None
    };

    let target = session::take_saved_request(&session)
        .await?
        .unwrap_or_else(|| WELCOME_URL.to_string());

    let mut response = found(&target);
    if let Some(value) = set_cookie {
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}

/// GET /login/welcome
async fn welcome(CurrentUser(principal): CurrentUser) -> impl IntoResponse {
    pages::welcome(&principal)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login/page", get(login_page))
        .route("/login/account", post(login_account))
        .route("/login/welcome", get(welcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        for v in ["on", "yes", "true", "1", "ON", " True "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["", "off", "no", "0", "false"] {
            assert!(!is_truthy(v), "{v}");
        }
    }
}
