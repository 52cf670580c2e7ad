//! # Access Control
//!
//! Permission evaluation engine: decides whether a subject's granted
//! permissions satisfy a declared requirement.
//!
//! ## Features
//! - Glob scope matching over `:`/`/` separated resource identifiers
//! - Scope templates resolved from request parameters
//! - `All` / `Any` requirement trees with short-circuit evaluation
//! - Failure tracking for denial diagnostics
//!
//! ## Example
//!
//! ```
//! use accesscontrol::{AccessControl, PermissionSet, ScopeParams};
//! use accesscontrol::evaluator::eval_permission;
//! use accesscontrol::scope::ScopeProvider;
//!
//! let reports = ScopeProvider::new("reports");
//! let declared = eval_permission("reports:read", reports.resource_scope_parameter("id", ":reportId"));
//!
//! let permissions = PermissionSet::new().with("reports:read", [reports.resource_all_id_scope()]);
//! let params = ScopeParams::from([(":reportId".to_string(), "1".to_string())]);
//!
//! let decision = AccessControl::default()
//!     .evaluate(&permissions, &declared, &params)
//!     .unwrap();
//! assert!(decision.allowed);
//! ```

pub mod access;
pub mod error;
pub mod evaluator;
pub mod scope;
pub mod types;

pub use access::{AccessControl, AccessControlConfig, Decision};
pub use error::{AccessControlError, Result};
pub use evaluator::{eval_all, eval_any, eval_permission, Evaluation, Evaluator, FailureTracker, Permission};
pub use types::{PermissionSet, ScopeParams, SCOPE_ALL, SCOPE_NONE};
