//! Credential directory

use std::collections::HashMap;
use tracing::debug;

use crate::models::{Role, User};

/// Read-only lookup of users by username
///
/// Implementations must be side-effect free and safe to call concurrently.
pub trait CredentialDirectory: Send + Sync {
    /// Look up a user by username
    fn lookup(&self, username: &str) -> Option<User>;
}

/// Directory backed by an immutable in-memory map
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, User>,
}

impl InMemoryDirectory {
    /// Build a directory from user records; later duplicates replace earlier ones
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.username.clone(), u))
                .collect(),
        }
    }

    /// Build the two demo accounts, encoding their secrets with `encode`
    ///
    /// - `test1` / `123456` with `ROLE_USER`
    /// - `admin` / `asdfgh` with `ROLE_USER` and `ROLE_ADMIN`
    pub fn demo<E, F>(encode: F) -> Result<Self, E>
    where
        F: Fn(&str) -> Result<String, E>,
    {
        let accounts = [
            ("test1", "123456", vec![Role::user()]),
            ("admin", "asdfgh", vec![Role::user(), Role::admin()]),
        ];

        let mut users = Vec::with_capacity(accounts.len());
        for (username, password, roles) in accounts {
            let hash = encode(password)?;
            debug!(
                "Encoded secret for {} ({} characters)",
                username,
                hash.len()
            );
            users.push(User::new(username, hash, roles));
        }

        Ok(Self::from_users(users))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialDirectory for InMemoryDirectory {
    fn lookup(&self, username: &str) -> Option<User> {
        let user = self.users.get(username).cloned();
        debug!("Directory lookup for {}: found={}", username, user.is_some());
        user
    }
}
