//! Authorization middleware and principal extractor
//!
//! Every request passes through [`authorize`]: it loads the session
//! principal, falls back to a remember-me login, and applies the rule
//! table before the handler runs. Ignored paths are handed straight to
//! the handler.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rolegate_core::{AuthMethod, AuthState, Decision, Principal};
use tower_sessions::Session;
use tracing::{debug, info};

use crate::cookies;
use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

/// Extractor for the authenticated principal (required)
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Log in from a remember-me cookie, rotating the token
async fn remember_me_login(
    state: &AppState,
    session: &Session,
    cookie: &str,
) -> Result<(Principal, String), ApiError> {
    let (username, token) = state.remember_me.rotate(cookie).await?;
    let principal = state
        .authenticator
        .load_principal(&username, AuthMethod::RememberMe)?;
    session::bind_principal(session, &principal).await?;
    info!("User {} logged in from remember-me token", principal.username);
    metrics::counter!("rolegate_logins_total", "method" => "remember-me", "outcome" => "success")
        .increment(1);
    Ok((principal, token.cookie_value()))
}

/// Authorization middleware
pub async fn authorize(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    if state.rules.is_ignored(&path) {
        return Ok(next.run(request).await);
    }

    let mut principal = session::principal(&session).await?;
    let mut set_cookie = None;

    let remember_cookie = principal
        .is_none()
        .then(|| cookies::read(request.headers(), &state.settings.remember_me_cookie))
        .flatten()
        .filter(|c| !c.is_empty());

    if let Some(cookie) = remember_cookie {
        match remember_me_login(&state, &session, &cookie).await {
            Ok((p, value)) => {
                principal = Some(p);
                set_cookie = cookies::remember_me(
                    &state.settings,
                    value,
                    state.remember_me.validity_seconds(),
                );
            }
            Err(e) => {
                debug!("Remember-me login rejected: {}", e);
                set_cookie = cookies::clear_remember_me(&state.settings);
            }
        }
    }

    let decision = state
        .rules
        .decide(&path, AuthState::from_principal(principal.as_ref()));

    let mut response = match decision {
        Decision::Allow => {
            if let Some(p) = principal {
                request.extensions_mut().insert(p);
            }
            next.run(request).await
        }
        Decision::Deny => {
            metrics::counter!("rolegate_access_denied_total").increment(1);
            ApiError::Forbidden.into_response()
        }
        Decision::Authenticate => {
            let had_session =
                cookies::present(request.headers(), &state.settings.session_cookie);
            if had_session && session.is_empty().await {
                debug!("Request for {} carried an expired session", path);
                ApiError::SessionExpired.into_response()
            } else {
                if request.method() == Method::GET {
                    let target = request
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or(path);
                    session::save_request(&session, &target).await?;
                }
                ApiError::Unauthenticated.into_response()
            }
        }
    };

    if let Some(value) = set_cookie {
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}
