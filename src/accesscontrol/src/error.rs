//! Error types for the permission evaluation engine
//!
//! A denial is never an error: `evaluate` returns `Ok(false)` for it. Every
//! variant here points at a defect in how permissions or requirements were
//! authored, or at a request that lacks a parameter the declaration needs.

use thiserror::Error;

/// Permission evaluation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessControlError {
    /// A held scope could not be compiled as a glob pattern
    #[error("Invalid scope pattern '{pattern}': {reason}")]
    InvalidScopePattern { pattern: String, reason: String },

    /// A scope template has broken placeholder syntax
    #[error("Malformed scope template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A required scope still carries a placeholder at evaluation time
    #[error("Scope '{scope}' has unresolved parameters, inject before evaluating")]
    UnresolvedTemplate { scope: String },

    /// Injection referenced a parameter the request did not supply
    #[error("Missing parameter '{key}' for scope template '{template}'")]
    MissingParameter { key: String, template: String },

    /// Declared evaluator tree nests deeper than the configured limit
    #[error("Evaluator tree depth {depth} exceeds maximum {max}")]
    TreeTooDeep { depth: usize, max: usize },
}

impl AccessControlError {
    /// True for errors caused by badly authored permissions or declarations
    pub fn is_configuration_error(&self) -> bool {
        !self.is_missing_parameter()
    }

    /// True when injection failed because a request parameter was absent
    pub fn is_missing_parameter(&self) -> bool {
        matches!(self, Self::MissingParameter { .. })
    }
}

/// Result type for access control operations
pub type Result<T> = std::result::Result<T, AccessControlError>;
