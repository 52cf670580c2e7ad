//! Failed permission tracking for one evaluation

use super::permission::Permission;

/// Leaf permissions that were not held during one evaluation
///
/// Trackers are request-local: create one per evaluation (or reuse one, as
/// [`Evaluator::evaluate_tracked`](super::Evaluator::evaluate_tracked)
/// resets it first) and never store it on a shared tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureTracker {
    failed: Vec<Permission>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a leaf that evaluated to false
    pub fn record(&mut self, permission: &Permission) {
        self.failed.push(permission.clone());
    }

    /// Moves every failure of `other` into this tracker
    pub(crate) fn absorb(&mut self, other: FailureTracker) {
        self.failed.extend(other.failed);
    }

    /// Failed leaves, in evaluation order
    pub fn failed(&self) -> &[Permission] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn reset(&mut self) {
        self.failed.clear();
    }

    pub fn into_failed(self) -> Vec<Permission> {
        self.failed
    }
}
