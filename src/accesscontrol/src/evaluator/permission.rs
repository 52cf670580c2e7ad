//! Leaf permission check

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use super::failure::FailureTracker;
use crate::error::{AccessControlError, Result};
use crate::scope::{has_parameters, matches_any, resolve, ScopeTemplate};
use crate::types::{PermissionSet, ScopeParams, SCOPE_NONE};

/// A required action on a required scope
///
/// The scope may be a template until [`Permission::inject`] resolves it.
/// An empty scope (`SCOPE_NONE`) only requires the action to be held.
///
/// Once resolved, the scope is a literal: parameter values are never read
/// back as template syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PermissionDecl")]
pub struct Permission {
    action: String,

    scope: String,

    /// Scope holds no placeholders, either as declared or after injection
    #[serde(skip)]
    resolved: bool,
}

/// Serialized form of a declared permission
#[derive(Deserialize)]
struct PermissionDecl {
    action: String,

    #[serde(default)]
    scope: String,
}

impl From<PermissionDecl> for Permission {
    fn from(decl: PermissionDecl) -> Self {
        Self::new(decl.action, decl.scope)
    }
}

impl Permission {
    pub fn new(action: impl Into<String>, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        // Malformed templates stay unresolved and fail on evaluation
        let resolved = matches!(has_parameters(&scope), Ok(false));

        Self {
            action: action.into(),
            scope,
            resolved,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Checks the permission, recording it in `tracker` when not held
    ///
    /// # Errors
    ///
    /// `UnresolvedTemplate` if a templated scope was never injected,
    /// `MalformedTemplate` if the declared scope has broken placeholders,
    /// `InvalidScopePattern` if a held scope for the action is not a valid glob.
    pub fn evaluate(&self, permissions: &PermissionSet, tracker: &mut FailureTracker) -> Result<bool> {
        if !self.resolved {
            ScopeTemplate::parse(&self.scope)?;
            return Err(AccessControlError::UnresolvedTemplate {
                scope: self.scope.clone(),
            });
        }

        let granted = match permissions.scopes(&self.action) {
            None => false,
            Some(_) if self.scope == SCOPE_NONE => true,
            Some(held) => matches_any(held.iter().map(String::as_str), &self.scope)?,
        };

        trace!("Permission check: {} -> {}", self, granted);

        if !granted {
            tracker.record(self);
        }
        Ok(granted)
    }

    /// Returns a copy with the scope resolved against `params`
    ///
    /// A resolved permission is returned unchanged.
    pub fn inject(&self, params: &ScopeParams) -> Result<Self> {
        if self.resolved {
            return Ok(self.clone());
        }

        Ok(Self {
            action: self.action.clone(),
            scope: resolve(&self.scope, params)?,
            resolved: true,
        })
    }

    /// True once the scope carries no placeholders
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == SCOPE_NONE {
            write!(f, "permission({})", self.action)
        } else {
            write!(f, "permission({}, {})", self.action, self.scope)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_binds_action() {
        let permission = Permission::new("reports:read", "reports:1");
        assert_eq!(permission.action(), "reports:read");
        assert_eq!(permission.scope(), "reports:1");
    }

    #[test]
    fn test_missing_action_is_recorded() {
        let permission = Permission::new("reports:read", "reports:1");
        let mut tracker = FailureTracker::new();

        assert!(!permission.evaluate(&PermissionSet::new(), &mut tracker).unwrap());
        assert_eq!(tracker.failed(), &[permission]);
    }

    #[test]
    fn test_scope_none_needs_only_action() {
        let permission = Permission::new("reports:read", SCOPE_NONE);
        let mut tracker = FailureTracker::new();

        let held = PermissionSet::new().with("reports:read", Vec::<String>::new());
        assert!(permission.evaluate(&held, &mut tracker).unwrap());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unresolved_scope_is_an_error() {
        let permission = Permission::new("reports:read", "reports:{{:reportId}}");
        let held = PermissionSet::new().with("reports:read", ["reports:*"]);

        let err = permission.evaluate(&held, &mut FailureTracker::new()).unwrap_err();
        assert!(matches!(err, AccessControlError::UnresolvedTemplate { .. }));
    }

    #[test]
    fn test_inject_leaves_original_untouched() {
        let declared = Permission::new("reports:read", "reports:{{:reportId}}");
        let params = ScopeParams::from([(":reportId".to_string(), "1".to_string())]);

        let injected = declared.inject(&params).unwrap();
        assert_eq!(injected, Permission::new("reports:read", "reports:1"));
        assert_eq!(declared.scope(), "reports:{{:reportId}}");
    }

    #[test]
    fn test_injected_braces_are_not_placeholders() {
        let declared = Permission::new("reports:read", "reports:{{:reportId}}");
        let params = ScopeParams::from([(":reportId".to_string(), "{{abc".to_string())]);
        let held = PermissionSet::new().with("reports:read", ["reports:1"]);

        let injected = declared.inject(&params).unwrap();
        assert!(injected.is_resolved());
        assert_eq!(injected.scope(), "reports:{{abc");
        assert!(!injected.evaluate(&held, &mut FailureTracker::new()).unwrap());
        assert_eq!(injected.inject(&ScopeParams::new()).unwrap(), injected);
    }

    #[test]
    fn test_literal_scope_is_resolved() {
        assert!(Permission::new("reports:read", "reports:1").is_resolved());
        assert!(Permission::new("reports:read", SCOPE_NONE).is_resolved());
        assert!(!Permission::new("reports:read", "reports:{{:reportId}}").is_resolved());
        assert!(!Permission::new("reports:read", "reports:{{:reportId").is_resolved());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Permission::new("reports:read", "reports:1").to_string(),
            "permission(reports:read, reports:1)"
        );
        assert_eq!(Permission::new("reports:read", "").to_string(), "permission(reports:read)");
    }
}
