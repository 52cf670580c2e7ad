//! Core access control types

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Held scope that grants every required scope
pub const SCOPE_ALL: &str = "*";

/// Required scope meaning "holding the action is enough"
pub const SCOPE_NONE: &str = "";

/// Request parameters used to resolve scope templates (e.g. `":reportId" -> "1"`)
pub type ScopeParams = HashMap<String, String>;

/// Snapshot of the permissions a subject holds
///
/// Maps an action (e.g. `"settings:write"`) to the scopes held for it
/// (e.g. `{"settings:**"}`). Held scopes are glob patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    actions: HashMap<String, HashSet<String>>,
}

impl PermissionSet {
    /// Create an empty permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action with the given scopes
    pub fn with<I, S>(mut self, action: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions
            .entry(action.into())
            .or_default()
            .extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Grant a single scope for an action
    pub fn grant(&mut self, action: impl Into<String>, scope: impl Into<String>) {
        self.actions
            .entry(action.into())
            .or_default()
            .insert(scope.into());
    }

    /// Scopes held for an action, if the action is held at all
    pub fn scopes(&self, action: &str) -> Option<&HashSet<String>> {
        self.actions.get(action)
    }

    /// Whether the action is present, regardless of scopes
    pub fn contains_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Number of distinct actions held
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate over held actions
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl<A, I, S> FromIterator<(A, I)> for PermissionSet
where
    A: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (A, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (action, scopes)| set.with(action, scopes))
    }
}
