//! Access control entry point
//!
//! Runs the full check for one guarded operation: depth guard, injection of
//! request parameters, evaluation against the subject's permissions, and a
//! logged [`Decision`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AccessControlError, Result};
use crate::evaluator::{Evaluator, Permission};
use crate::types::{PermissionSet, ScopeParams};

/// Access control configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Deepest evaluator tree accepted
    pub max_depth: usize,

    /// Log denials at `info` instead of `debug`
    pub log_denials: bool,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            log_denials: true,
        }
    }
}

/// Result of an access check
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Unique decision identifier
    pub id: String,

    /// Whether the subject may proceed
    pub allowed: bool,

    /// Permissions that were missing, empty when allowed
    pub failed: Vec<Permission>,

    /// Decision timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl Decision {
    fn new(allowed: bool, failed: Vec<Permission>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4().to_string(),
            allowed,
            failed,
            timestamp,
        }
    }

    /// Allow decision
    pub fn allow() -> Self {
        Self::new(true, Vec::new())
    }

    /// Deny decision listing the missing permissions
    pub fn deny(failed: Vec<Permission>) -> Self {
        Self::new(false, failed)
    }

    /// Human readable explanation
    pub fn reason(&self) -> String {
        if self.allowed {
            return "All required permissions are held".to_string();
        }

        if self.failed.is_empty() {
            return "No alternative permission is held".to_string();
        }

        let missing: Vec<String> = self.failed.iter().map(ToString::to_string).collect();
        format!("Missing {}", missing.join(", "))
    }
}

/// Evaluates declared requirements for requests
///
/// Holds no per-request state; one instance can serve every request.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    config: AccessControlConfig,
}

impl AccessControl {
    pub fn new(config: AccessControlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AccessControlConfig {
        &self.config
    }

    /// Checks `declared` for one request
    ///
    /// # Errors
    ///
    /// Any error means the declaration or the held permissions are broken,
    /// or the request lacks a parameter; it is never a denial.
    pub fn evaluate(
        &self,
        permissions: &PermissionSet,
        declared: &Evaluator,
        params: &ScopeParams,
    ) -> Result<Decision> {
        if declared.exceeds_depth(self.config.max_depth) {
            let depth = declared.depth();
            warn!("Rejecting evaluator: depth {} > {}", depth, self.config.max_depth);
            return Err(AccessControlError::TreeTooDeep {
                depth,
                max: self.config.max_depth,
            });
        }

        let resolved = declared.inject(params).map_err(|e| {
            warn!("Failed to inject parameters into {}: {}", declared, e);
            e
        })?;

        let evaluation = resolved.check(permissions).map_err(|e| {
            warn!("Failed to evaluate {}: {}", resolved, e);
            e
        })?;

        if evaluation.granted() {
            debug!("Access granted: {}", resolved);
            return Ok(Decision::allow());
        }

        let decision = Decision::deny(evaluation.into_failed());
        if self.config.log_denials {
            info!("Access denied: {} ({})", resolved, decision.reason());
        } else {
            debug!("Access denied: {} ({})", resolved, decision.reason());
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{eval_all, eval_permission};

    #[test]
    fn test_config_defaults() {
        let config = AccessControlConfig::default();
        assert_eq!(config.max_depth, 32);
        assert!(config.log_denials);
    }

    #[test]
    fn test_decision_reason() {
        assert!(Decision::allow().allowed);
        assert_eq!(Decision::allow().failed.len(), 0);

        let deny = Decision::deny(vec![
            Permission::new("reports:read", "reports:1"),
            Permission::new("reports:admin", ""),
        ]);
        assert!(!deny.allowed);
        assert!(!deny.id.is_empty());
        assert_eq!(
            deny.reason(),
            "Missing permission(reports:read, reports:1), permission(reports:admin)"
        );
    }

    #[test]
    fn test_depth_limit() {
        let access = AccessControl::new(AccessControlConfig {
            max_depth: 2,
            ..Default::default()
        });
        let declared = eval_all([eval_all([eval_permission("a", "")])]);

        let err = access
            .evaluate(&PermissionSet::new(), &declared, &ScopeParams::new())
            .unwrap_err();
        assert_eq!(err, AccessControlError::TreeTooDeep { depth: 3, max: 2 });
    }

    #[test]
    fn test_very_deep_tree_is_rejected_without_recursing() {
        let mut declared = eval_permission("a", "");
        for _ in 0..100_000 {
            declared = eval_all([declared]);
        }

        let err = AccessControl::default()
            .evaluate(&PermissionSet::new(), &declared, &ScopeParams::new())
            .unwrap_err();
        assert_eq!(err, AccessControlError::TreeTooDeep { depth: 100_001, max: 32 });

        // Unwind by hand; the derived drop glue recurses per level
        let mut node = declared;
        while let Evaluator::All(mut children) = node {
            node = match children.pop() {
                Some(child) => child,
                None => break,
            };
        }
    }
}
