//! Rule configuration errors

use thiserror::Error;

/// Errors raised while building the rule table
///
/// These are configuration errors and are expected to abort startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Role list cannot be empty")]
    EmptyRoleList,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(String),
}
