//! Rolegate Core Authorization Logic
//!
//! This crate provides the session principal and the ordered
//! path-pattern rule table that decides whether a request may proceed.

pub mod error;
pub mod principal;
pub mod rules;

pub use error::RuleError;
pub use principal::{AuthMethod, Principal};
pub use rules::{
    AccessPredicate, AuthState, Decision, PathPattern, Requirement, RoleIntersection, Rule,
    RuleSet, RuleSetBuilder,
};
