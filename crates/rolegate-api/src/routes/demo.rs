//! Role-gated test endpoints
//!
//! Access to each is decided entirely by the rule table; the handlers
//! only name themselves.

use axum::{Router, routing::get};

use crate::state::AppState;

async fn user_auth() -> &'static str {
    "userAuth"
}

async fn admin_auth() -> &'static str {
    "adminAuth"
}

async fn other_auth() -> &'static str {
    "otherAuth"
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/userAuth/test", get(user_auth))
        .route("/adminAuth/test", get(admin_auth))
        .route("/otherAuth/test", get(other_auth))
}
