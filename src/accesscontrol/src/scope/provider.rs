//! Helpers for building resource scopes

use std::fmt;

use super::template::{combine, parameter};
use crate::types::SCOPE_ALL;

/// Builds scopes rooted at one resource kind
///
/// ```
/// use accesscontrol::scope::ScopeProvider;
///
/// let dashboards = ScopeProvider::new("dashboards");
/// assert_eq!(dashboards.resource_scope_uid("abc"), "dashboards:uid:abc");
/// assert_eq!(dashboards.resource_all_scope(), "dashboards:*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeProvider {
    root: String,
}

impl ScopeProvider {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Resource kind this provider builds scopes for
    pub fn root(&self) -> &str {
        &self.root
    }

    /// `<root>:id:<id>`
    pub fn resource_scope(&self, id: impl fmt::Display) -> String {
        combine([self.root.as_str(), "id", id.to_string().as_str()])
    }

    /// `<root>:uid:<uid>`
    pub fn resource_scope_uid(&self, uid: &str) -> String {
        combine([self.root.as_str(), "uid", uid])
    }

    /// `<root>:name:<name>`
    pub fn resource_scope_name(&self, name: &str) -> String {
        combine([self.root.as_str(), "name", name])
    }

    /// Template resolving `attribute` from the request parameter `key`,
    /// e.g. `dashboards:uid:{{:uid}}`
    pub fn resource_scope_parameter(&self, attribute: &str, key: &str) -> String {
        combine([self.root.as_str(), attribute, parameter(key).as_str()])
    }

    /// `<root>:*`
    pub fn resource_all_scope(&self) -> String {
        combine([self.root.as_str(), SCOPE_ALL])
    }

    /// `<root>:id:*`
    pub fn resource_all_id_scope(&self) -> String {
        combine([self.root.as_str(), "id", SCOPE_ALL])
    }
}

/// Held scopes granting everything under `prefix`
///
/// `dashboards:uid:` yields `["*", "dashboards:*", "dashboards:uid:*"]`.
pub fn wildcards_from_prefix(prefix: &str) -> Vec<String> {
    let mut wildcards = vec![SCOPE_ALL.to_string()];
    let mut current = String::new();

    for part in prefix.split(':').filter(|part| !part.is_empty()) {
        current.push_str(part);
        current.push(':');
        wildcards.push(format!("{}{}", current, SCOPE_ALL));
    }

    wildcards
}
