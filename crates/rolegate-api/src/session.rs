//! Session layer and session-bound values

use rolegate_core::Principal;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::error::ApiError;
use crate::state::WebSettings;

/// Session key holding the authenticated principal
pub const PRINCIPAL_KEY: &str = "rolegate.principal";
/// Session key holding the path to resume after login
pub const SAVED_REQUEST_KEY: &str = "rolegate.saved_request";
/// Session key holding the CSRF token
pub const CSRF_KEY: &str = "rolegate.csrf";

/// Build the session layer over a volatile in-memory store
pub fn session_layer(settings: &WebSettings) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(settings.session_cookie.clone())
        .with_secure(settings.session_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            settings.session_inactivity_minutes,
        )))
}

pub async fn principal(session: &Session) -> Result<Option<Principal>, ApiError> {
    Ok(session.get::<Principal>(PRINCIPAL_KEY).await?)
}

/// Bind a freshly authenticated principal to the session
///
/// The session id is cycled first so an id planted before login cannot be
/// used to ride the authenticated session.
pub async fn bind_principal(session: &Session, principal: &Principal) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(PRINCIPAL_KEY, principal).await?;
    // A new token is issued with the next form
    session.remove::<String>(CSRF_KEY).await?;
    Ok(())
}

/// Remember where an anonymous caller was going
pub async fn save_request(session: &Session, target: &str) -> Result<(), ApiError> {
    if is_local_path(target) {
        session.insert(SAVED_REQUEST_KEY, target).await?;
    }
    Ok(())
}

/// Take the saved target, if any
pub async fn take_saved_request(session: &Session) -> Result<Option<String>, ApiError> {
    let target = session.remove::<String>(SAVED_REQUEST_KEY).await?;
    Ok(target.filter(|t| is_local_path(t)))
}

/// Only same-origin absolute paths are valid redirect targets
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
