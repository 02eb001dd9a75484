//! Rolegate Credential Directory
//!
//! This crate provides the user and role model together with the
//! read-only credential directory that authentication looks users up in.

pub mod directory;
pub mod models;

pub use directory::{CredentialDirectory, InMemoryDirectory};
pub use models::*;
