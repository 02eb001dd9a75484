//! Rolegate Authentication
//!
//! This crate provides password encoding, the credential check that turns
//! a username and password into a session principal, and the remember-me
//! token service with its swappable token repository.

pub mod authenticator;
pub mod error;
pub mod password;
pub mod remember_me;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use password::{HashSettings, PasswordEncoder};
pub use remember_me::{
    constant_time_eq, random_hex, InMemoryTokenRepository, PersistentToken, RememberMeError,
    RememberMeService, RememberMeToken, TokenRepository,
};
