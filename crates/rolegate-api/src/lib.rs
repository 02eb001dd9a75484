//! Rolegate HTTP API
//!
//! This crate provides the Axum router for the login and logout pages and
//! the role-gated endpoints, together with the session, CSRF and
//! authorization layers that protect them.

pub mod error;
pub mod guard;
pub mod routes;
pub mod session;
pub mod state;

mod cookies;
mod csrf;
mod pages;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle, WebSettings};
