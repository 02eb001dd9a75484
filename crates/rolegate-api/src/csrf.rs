//! Synchronizer-token CSRF protection for form posts

use tower_sessions::Session;
use tracing::warn;

use crate::error::ApiError;
use crate::session::CSRF_KEY;
use crate::state::AppState;

/// Hidden form field carrying the token
pub const CSRF_FIELD: &str = "_csrf";

/// The session's token, created on first use; `None` when CSRF is disabled
pub async fn token(state: &AppState, session: &Session) -> Result<Option<String>, ApiError> {
    if !state.settings.csrf_enabled {
        return Ok(None);
    }
    if let Some(existing) = session.get::<String>(CSRF_KEY).await? {
        return Ok(Some(existing));
    }
    let fresh = rolegate_auth::random_hex();
    session.insert(CSRF_KEY, &fresh).await?;
    Ok(Some(fresh))
}

/// Check a submitted token against the session's
pub async fn verify(
    state: &AppState,
    session: &Session,
    presented: Option<&str>,
) -> Result<(), ApiError> {
    if !state.settings.csrf_enabled {
        return Ok(());
    }
    let expected = session.get::<String>(CSRF_KEY).await?;
    match (expected, presented) {
        (Some(expected), Some(presented))
            if rolegate_auth::constant_time_eq(&expected, presented) =>
        {
            Ok(())
        }
        _ => {
            warn!("Rejected form post with missing or stale CSRF token");
            Err(ApiError::InvalidCsrfToken)
        }
    }
}
