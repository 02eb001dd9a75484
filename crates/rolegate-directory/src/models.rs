//! Directory models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Prefix that marks an authority as a role rather than a plain permission
pub const ROLE_PREFIX: &str = "ROLE_";

/// Error type for parsing models from strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EmptyRoleName,
    InvalidRoleName(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyRoleName => write!(f, "Role name cannot be empty"),
            ParseError::InvalidRoleName(s) => write!(f, "Invalid role name: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// A role grant, always stored with the `ROLE_` prefix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a role from its short name, adding the prefix if missing
    ///
    /// `Role::new("ADMIN")` and `Role::new("ROLE_ADMIN")` are the same role.
    pub fn new(name: &str) -> Self {
        if name.starts_with(ROLE_PREFIX) {
            Self(name.to_string())
        } else {
            Self(format!("{}{}", ROLE_PREFIX, name))
        }
    }

    /// Parse a full authority string such as `ROLE_USER`
    pub fn parse(authority: &str) -> Result<Self, ParseError> {
        authority.parse()
    }

    pub fn user() -> Self {
        Self::new("USER")
    }

    pub fn admin() -> Self {
        Self::new("ADMIN")
    }

    /// The full authority string, prefix included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The role name without the prefix
    pub fn name(&self) -> &str {
        &self.0[ROLE_PREFIX.len()..]
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let name = s.strip_prefix(ROLE_PREFIX).unwrap_or(s);
        if name.is_empty() {
            return Err(ParseError::EmptyRoleName);
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParseError::InvalidRoleName(s.to_string()));
        }
        Ok(Role::new(name))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub enabled: bool,
    pub roles: BTreeSet<Role>,
}

impl User {
    pub fn new(username: &str, password_hash: String, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.to_string(),
            password_hash,
            enabled: true,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
