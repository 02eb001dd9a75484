//! Path-based authorization rules
//!
//! Rules are evaluated first-match-wins in declaration order. A request
//! whose path matches no rule only needs an authenticated principal.
//! Ignored paths sit outside the rule table and outside the security chain.

mod pattern;
mod predicate;

pub use pattern::PathPattern;
pub use predicate::{AccessPredicate, RoleIntersection};

use rolegate_directory::Role;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::RuleError;
use crate::principal::Principal;

/// Authentication state of the current request
#[derive(Debug, Clone, Copy)]
pub enum AuthState<'a> {
    Unauthenticated,
    Authenticated(&'a Principal),
}

impl<'a> AuthState<'a> {
    pub fn from_principal(principal: Option<&'a Principal>) -> Self {
        match principal {
            Some(p) => AuthState::Authenticated(p),
            None => AuthState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Dispatch to the handler
    Allow,
    /// Authenticated but lacking the required role
    Deny,
    /// No principal; send the caller to the login entry point
    Authenticate,
}

/// What a matched rule requires of the caller
#[derive(Debug, Clone)]
pub enum Requirement<P = RoleIntersection> {
    PermitAll,
    /// Static check: principal holds at least one of the roles
    AnyRole(BTreeSet<Role>),
    /// Custom predicate over the principal's roles
    Custom(P),
    Authenticated,
}

/// A set of patterns sharing one requirement
#[derive(Debug, Clone)]
pub struct Rule<P = RoleIntersection> {
    patterns: Vec<PathPattern>,
    requirement: Requirement<P>,
}

impl<P> Rule<P> {
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    pub fn requirement(&self) -> &Requirement<P> {
        &self.requirement
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }
}

/// Ordered rule table
#[derive(Debug, Clone)]
pub struct RuleSet<P = RoleIntersection> {
    ignored: Vec<PathPattern>,
    rules: Vec<Rule<P>>,
}

impl RuleSet {
    /// The demo application's rule table
    pub fn demo() -> Result<Self, RuleError> {
        RuleSet::builder()
            .ignoring(&["/js/**", "/images/**"])?
            .permit_all(&["/login/page", "/logout/result", "/login/account"])?
            .has_any_role(&["/userAuth/**"], &["USER", "ADMIN"])?
            .access(
                &["/adminAuth/**", "/actuator/**"],
                RoleIntersection::new(&["ROLE_ADMIN"])?,
            )?
            .build()
    }
}

impl<P: AccessPredicate> RuleSet<P> {
    pub fn builder() -> RuleSetBuilder<P> {
        RuleSetBuilder {
            ignored: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Whether the path bypasses sessions, remember-me and rules entirely
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.iter().any(|p| p.matches(path))
    }

    /// First rule matching the path, if any
    pub fn matching_rule(&self, path: &str) -> Option<&Rule<P>> {
        self.rules.iter().find(|r| r.matches(path))
    }

    /// Whether the path is reachable without a principal
    pub fn is_public(&self, path: &str) -> bool {
        self.is_ignored(path)
            || matches!(
                self.matching_rule(path).map(Rule::requirement),
                Some(Requirement::PermitAll)
            )
    }

    /// Decide whether a request for `path` may proceed
    pub fn decide(&self, path: &str, state: AuthState<'_>) -> Decision {
        if self.is_ignored(path) {
            return Decision::Allow;
        }
        let decision = match (self.matching_rule(path).map(Rule::requirement), state) {
            (Some(Requirement::PermitAll), _) => Decision::Allow,
            (Some(_), AuthState::Unauthenticated) | (None, AuthState::Unauthenticated) => {
                Decision::Authenticate
            }
            (Some(Requirement::AnyRole(roles)), AuthState::Authenticated(principal)) => {
                if principal.has_any_role(roles) {
                    Decision::Allow
                } else {
                    Decision::Deny
                }
            }
            (Some(Requirement::Custom(predicate)), AuthState::Authenticated(principal)) => {
                predicate.decide(&principal.roles)
            }
            (Some(Requirement::Authenticated), AuthState::Authenticated(_))
            | (None, AuthState::Authenticated(_)) => Decision::Allow,
        };

        debug!(
            "Authorization for {} (authenticated={}): {:?}",
            path,
            state.is_authenticated(),
            decision
        );
        decision
    }

    pub fn rules(&self) -> &[Rule<P>] {
        &self.rules
    }
}

/// Builder for [`RuleSet`]
pub struct RuleSetBuilder<P = RoleIntersection> {
    ignored: Vec<PathPattern>,
    rules: Vec<Rule<P>>,
}

fn compile(patterns: &[&str]) -> Result<Vec<PathPattern>, RuleError> {
    patterns.iter().map(|p| PathPattern::new(p)).collect()
}

impl<P: AccessPredicate> RuleSetBuilder<P> {
    fn push(mut self, patterns: &[&str], requirement: Requirement<P>) -> Result<Self, RuleError> {
        let patterns = compile(patterns)?;
        self.rules.push(Rule {
            patterns,
            requirement,
        });
        Ok(self)
    }

    /// Keep paths out of the security chain (static assets)
    pub fn ignoring(mut self, patterns: &[&str]) -> Result<Self, RuleError> {
        self.ignored.extend(compile(patterns)?);
        Ok(self)
    }

    /// Anyone, including anonymous callers
    pub fn permit_all(self, patterns: &[&str]) -> Result<Self, RuleError> {
        self.push(patterns, Requirement::PermitAll)
    }

    /// Any of the listed roles; names are prefixed with `ROLE_` when missing
    pub fn has_any_role(self, patterns: &[&str], roles: &[&str]) -> Result<Self, RuleError> {
        if roles.is_empty() {
            return Err(RuleError::EmptyRoleList);
        }
        let roles = roles
            .iter()
            .map(|r| Role::parse(r).map_err(|_| RuleError::InvalidRole(r.to_string())))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.push(patterns, Requirement::AnyRole(roles))
    }

    /// Delegate to a custom predicate
    pub fn access(self, patterns: &[&str], predicate: P) -> Result<Self, RuleError> {
        self.push(patterns, Requirement::Custom(predicate))
    }

    /// Any authenticated principal
    pub fn authenticated(self, patterns: &[&str]) -> Result<Self, RuleError> {
        self.push(patterns, Requirement::Authenticated)
    }

    pub fn build(self) -> Result<RuleSet<P>, RuleError> {
        Ok(RuleSet {
            ignored: self.ignored,
            rules: self.rules,
        })
    }
}
