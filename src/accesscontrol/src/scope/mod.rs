//! Scope matching and scope templates
//!
//! Held scopes are glob patterns over `:`/`/` separated segments; required
//! scopes are literal strings, possibly built from templates whose
//! placeholders are filled from request parameters.
//!
//! # Examples
//!
//! ```
//! use accesscontrol::scope::{matches, resolve, combine, parameter};
//! use accesscontrol::ScopeParams;
//!
//! let template = combine(["reports", parameter(":reportId").as_str()]);
//! let params = ScopeParams::from([(":reportId".to_string(), "1".to_string())]);
//! let required = resolve(&template, &params).unwrap();
//!
//! assert!(matches("reports:*", &required).unwrap());
//! ```

mod matcher;
mod provider;
mod template;


pub use matcher::{matches, matches_any, ScopePattern};
pub use provider::{wildcards_from_prefix, ScopeProvider};
pub use template::{combine, has_parameters, parameter, resolve, ScopeTemplate, SEGMENT_SEPARATOR};
