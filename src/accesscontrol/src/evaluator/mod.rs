//! Permission evaluators
//!
//! An [`Evaluator`] is a tree of leaf [`Permission`] checks combined with
//! `All` (every child must hold) and `Any` (one child must hold). Trees are
//! declared once, typically per endpoint, and shared across requests:
//!
//! 1. [`Evaluator::inject`] resolves scope templates against the request's
//!    parameters and returns a new tree;
//! 2. [`Evaluator::evaluate`] (or [`Evaluator::check`]) runs the resolved
//!    tree against the subject's permissions.
//!
//! ```
//! use accesscontrol::evaluator::{eval_all, eval_any, eval_permission};
//! use accesscontrol::scope::{combine, parameter};
//! use accesscontrol::{PermissionSet, ScopeParams};
//!
//! let declared = eval_any([
//!     eval_permission("reports:admin", ""),
//!     eval_all([
//!         eval_permission("reports:read", combine(["reports", parameter(":reportId").as_str()])),
//!         eval_permission("datasources:query", "datasources:*"),
//!     ]),
//! ]);
//!
//! let params = ScopeParams::from([(":reportId".to_string(), "1".to_string())]);
//! let permissions = PermissionSet::new()
//!     .with("reports:read", ["reports:*"])
//!     .with("datasources:query", ["datasources:prom"]);
//!
//! let resolved = declared.inject(&params).unwrap();
//! assert!(resolved.evaluate(&permissions).unwrap());
//! ```

mod failure;
mod permission;


pub use failure::FailureTracker;
pub use permission::Permission;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::types::{PermissionSet, ScopeParams};

/// A node of a permission requirement tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluator {
    /// Single action + scope check
    Permission(Permission),

    /// Holds when every child holds; stops at the first child that does not
    All(Vec<Evaluator>),

    /// Holds when some child holds; stops at the first child that does
    Any(Vec<Evaluator>),
}

/// Outcome of one evaluation with the leaves that were not held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    granted: bool,
    failed: Vec<Permission>,
}

impl Evaluation {
    pub fn granted(&self) -> bool {
        self.granted
    }

    /// Leaves that caused the denial; empty when granted
    pub fn failed(&self) -> &[Permission] {
        &self.failed
    }

    pub fn into_failed(self) -> Vec<Permission> {
        self.failed
    }
}

impl Evaluator {
    /// Evaluates the tree, discarding failure details
    pub fn evaluate(&self, permissions: &PermissionSet) -> Result<bool> {
        self.evaluate_tracked(permissions, &mut FailureTracker::new())
    }

    /// Evaluates the tree, collecting failed leaves into `tracker`
    ///
    /// The tracker is reset first. Only visited leaves are recorded: `All`
    /// stops at its first failing child, and a satisfied `Any` records
    /// nothing.
    ///
    /// Recursion follows the tree's nesting. Trees from untrusted sources
    /// should be bounded first, as [`crate::AccessControl`] does with
    /// [`Evaluator::exceeds_depth`].
    pub fn evaluate_tracked(&self, permissions: &PermissionSet, tracker: &mut FailureTracker) -> Result<bool> {
        tracker.reset();
        self.evaluate_node(permissions, tracker)
    }

    /// Evaluates the tree and returns the outcome with its failures
    pub fn check(&self, permissions: &PermissionSet) -> Result<Evaluation> {
        let mut tracker = FailureTracker::new();
        let granted = self.evaluate_tracked(permissions, &mut tracker)?;

        Ok(Evaluation {
            granted,
            failed: tracker.into_failed(),
        })
    }

    fn evaluate_node(&self, permissions: &PermissionSet, tracker: &mut FailureTracker) -> Result<bool> {
        match self {
            Self::Permission(permission) => permission.evaluate(permissions, tracker),
            Self::All(children) => {
                for child in children {
                    if !child.evaluate_node(permissions, tracker)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any(children) => {
                // Failures only count if no alternative holds
                let mut attempts = FailureTracker::new();
                for child in children {
                    if child.evaluate_node(permissions, &mut attempts)? {
                        return Ok(true);
                    }
                }
                tracker.absorb(attempts);
                Ok(false)
            }
        }
    }

    /// Returns a new tree with every scope template resolved
    ///
    /// `self` is never modified, so one declared tree can be injected from
    /// many threads with different parameters.
    ///
    /// # Errors
    ///
    /// The first `MissingParameter` or `MalformedTemplate` encountered, in
    /// declaration order. No partial tree is returned.
    ///
    /// Leaves that are already resolved are copied as they are, so injecting
    /// a resolved tree again changes nothing. Like evaluation, injection
    /// recurses once per level of nesting.
    pub fn inject(&self, params: &ScopeParams) -> Result<Self> {
        Ok(match self {
            Self::Permission(permission) => Self::Permission(permission.inject(params)?),
            Self::All(children) => Self::All(inject_children(children, params)?),
            Self::Any(children) => Self::Any(inject_children(children, params)?),
        })
    }

    /// Nesting depth, a lone leaf has depth 1
    ///
    /// Walks the tree with an explicit stack, so it is safe to call on trees
    /// too deep to evaluate.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            if let Self::All(children) | Self::Any(children) = node {
                pending.extend(children.iter().map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    /// True when the tree nests deeper than `max`, stopping at the first
    /// node past the limit
    pub fn exceeds_depth(&self, max: usize) -> bool {
        let mut pending = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            if level > max {
                return true;
            }
            if let Self::All(children) | Self::Any(children) = node {
                pending.extend(children.iter().map(|child| (child, level + 1)));
            }
        }
        false
    }

    /// Every leaf of the tree in declaration order
    pub fn leaves(&self) -> Vec<&Permission> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Permission>) {
        match self {
            Self::Permission(permission) => leaves.push(permission),
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }
}

fn inject_children(children: &[Evaluator], params: &ScopeParams) -> Result<Vec<Evaluator>> {
    children.iter().map(|child| child.inject(params)).collect()
}

impl From<Permission> for Evaluator {
    fn from(permission: Permission) -> Self {
        Self::Permission(permission)
    }
}

impl fmt::Display for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, children) = match self {
            Self::Permission(permission) => return write!(f, "{}", permission),
            Self::All(children) => ("all", children),
            Self::Any(children) => ("any", children),
        };

        write!(f, "{}(", name)?;
        for (idx, child) in children.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")
    }
}

/// Requires `action` on `scope` (`""` requires only the action)
pub fn eval_permission(action: impl Into<String>, scope: impl Into<String>) -> Evaluator {
    Evaluator::Permission(Permission::new(action, scope))
}

/// Requires every evaluator to hold
pub fn eval_all(evaluators: impl IntoIterator<Item = Evaluator>) -> Evaluator {
    Evaluator::All(evaluators.into_iter().collect())
}

/// Requires at least one evaluator to hold
pub fn eval_any(evaluators: impl IntoIterator<Item = Evaluator>) -> Evaluator {
    Evaluator::Any(evaluators.into_iter().collect())
}
