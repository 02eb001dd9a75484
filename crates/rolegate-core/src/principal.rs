//! Session principal

use chrono::{DateTime, Utc};
use rolegate_directory::{Role, User};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a principal was established
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    Form,
    RememberMe,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Form => "form",
            AuthMethod::RememberMe => "remember-me",
        }
    }
}

/// Authenticated identity plus its resolved role grants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<Role>,
    pub authenticated_at: DateTime<Utc>,
    pub method: AuthMethod,
}

impl Principal {
    /// Derive a principal from a directory user
    pub fn from_user(user: &User, method: AuthMethod) -> Self {
        Self {
            username: user.username.clone(),
            roles: user.roles.clone(),
            authenticated_at: Utc::now(),
            method,
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> bool {
        roles.into_iter().any(|r| self.roles.contains(r))
    }

    /// Role names without the prefix, for display
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(Role::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_copies_roles() {
        let user = User::new("admin", String::new(), [Role::user(), Role::admin()]);
        let principal = Principal::from_user(&user, AuthMethod::Form);

        assert_eq!(principal.username, "admin");
        assert!(principal.has_role(&Role::admin()));
        assert!(principal.has_any_role(&[Role::new("AUDITOR"), Role::user()]));
        assert!(!principal.has_any_role(&[Role::new("AUDITOR")]));
        assert_eq!(principal.role_names(), vec!["ADMIN", "USER"]);
    }

    #[test]
    fn test_session_round_trip() {
        let user = User::new("test1", String::new(), [Role::user()]);
        let principal = Principal::from_user(&user, AuthMethod::RememberMe);

        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(json["method"], "remember-me");
        let restored: Principal = serde_json::from_value(json).unwrap();
        assert_eq!(restored, principal);
    }
}
