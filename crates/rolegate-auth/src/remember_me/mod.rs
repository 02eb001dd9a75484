//! Remember-me tokens
//!
//! A token is a `(series, value)` pair. The series identifies the login
//! across rotations; the value changes every time the token is used.
//! Only a digest of the value is stored.

mod repository;
mod service;

pub use repository::{InMemoryTokenRepository, PersistentToken, TokenRepository};
pub use service::{constant_time_eq, random_hex, RememberMeService, RememberMeToken};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RememberMeError {
    #[error("Invalid remember-me token")]
    Invalid,

    #[error("Remember-me token expired")]
    Expired,

    /// The series was presented with a stale value, so the cookie was
    /// copied and used elsewhere; every token of the user is revoked
    #[error("Remember-me token reuse detected for user {0}")]
    CookieTheft(String),

    #[error("Duplicate token series: {0}")]
    DuplicateSeries(String),
}
