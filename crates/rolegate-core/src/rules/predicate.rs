//! Custom access predicates

use rolegate_directory::Role;
use std::collections::BTreeSet;

use super::Decision;
use crate::error::RuleError;

/// A custom access check evaluated against the caller's role grants
pub trait AccessPredicate: Send + Sync {
    /// Decide `Allow` or `Deny` for the granted roles
    fn decide(&self, granted: &BTreeSet<Role>) -> Decision;
}

/// Allows when the granted roles intersect the required ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIntersection {
    required: BTreeSet<Role>,
}

impl RoleIntersection {
    /// Create from full authority names such as `ROLE_ADMIN`
    ///
    /// An empty list is rejected here so a misconfigured rule never reaches
    /// request handling.
    pub fn new(authorities: &[&str]) -> Result<Self, RuleError> {
        if authorities.is_empty() {
            return Err(RuleError::EmptyRoleList);
        }

        let required = authorities
            .iter()
            .map(|a| Role::parse(a).map_err(|_| RuleError::InvalidRole(a.to_string())))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self { required })
    }

    pub fn required(&self) -> &BTreeSet<Role> {
        &self.required
    }
}

impl AccessPredicate for RoleIntersection {
    fn decide(&self, granted: &BTreeSet<Role>) -> Decision {
        if granted.iter().any(|r| self.required.contains(r)) {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> BTreeSet<Role> {
        names.iter().map(|n| Role::new(n)).collect()
    }

    #[test]
    fn test_empty_role_list_rejected() {
        assert_eq!(RoleIntersection::new(&[]), Err(RuleError::EmptyRoleList));
    }

    #[test]
    fn test_invalid_role_rejected() {
        assert_eq!(
            RoleIntersection::new(&["ROLE_ADMIN", "not a role"]),
            Err(RuleError::InvalidRole("not a role".to_string()))
        );
    }

    #[test]
    fn test_intersection() {
        let predicate = RoleIntersection::new(&["ROLE_ADMIN"]).unwrap();
        assert_eq!(predicate.decide(&roles(&["USER", "ADMIN"])), Decision::Allow);
        assert_eq!(predicate.decide(&roles(&["USER"])), Decision::Deny);
        assert_eq!(predicate.decide(&BTreeSet::new()), Decision::Deny);
    }

    #[test]
    fn test_multiple_required_roles() {
        let predicate = RoleIntersection::new(&["ROLE_ADMIN", "ROLE_AUDITOR"]).unwrap();
        assert_eq!(predicate.decide(&roles(&["AUDITOR"])), Decision::Allow);
        assert_eq!(predicate.required().len(), 2);
    }
}
