//! A set of operations that run concurrently.

use super::Operation;
use std::time::Duration;

/// Operations that start together and must all complete before the pipeline
/// moves on.
#[derive(Debug, Clone, Default)]
pub struct OperationStep {
    operations: Vec<Operation>,
}

impl OperationStep {
    /// Creates a step holding a single operation.
    #[must_use]
    pub fn single(operation: impl Into<Operation>) -> Self {
        Self {
            operations: vec![operation.into()],
        }
    }

    /// Adds an operation that runs alongside the existing ones.
    pub fn push(&mut self, operation: impl Into<Operation>) {
        self.operations.push(operation.into());
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns whether the step has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the operations in insertion order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Iterates over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Time by which every operation of the step has completed.
    ///
    /// This is the largest `delay + duration` among effects, widened by wait
    /// timeouts and nested groups. Returns `None` if any member can wait
    /// indefinitely.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_with(None)
    }

    /// Like [`OperationStep::deadline`], bounding waits built without a
    /// timeout by `default_timeout`.
    #[must_use]
    pub fn deadline_with(&self, default_timeout: Option<Duration>) -> Option<Duration> {
        self.operations.iter().try_fold(Duration::ZERO, |longest, op| {
            Some(longest.max(op.deadline_with(default_timeout)?))
        })
    }
}

impl<'a> IntoIterator for &'a OperationStep {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for OperationStep {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}
