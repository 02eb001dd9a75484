//! Authentication error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unknown user")]
    UnknownUser,

    #[error("Bad credentials")]
    BadSecret,

    #[error("User account is disabled")]
    Disabled,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Failures that callers must see as one "invalid credentials" outcome
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::UnknownUser | AuthError::BadSecret | AuthError::Disabled
        )
    }
}
