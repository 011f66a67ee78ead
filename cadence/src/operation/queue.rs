//! FIFO queue of operation steps.

use super::OperationStep;
use std::collections::LinkedList;
use std::time::Duration;

/// An ordered queue of steps.
///
/// Backed by a linked list so that splicing another queue onto the tail is
/// O(1) and moves nodes instead of copying them.
#[derive(Debug, Default)]
pub struct OperationQueue {
    steps: LinkedList<OperationStep>,
}

impl OperationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step at the tail.
    pub fn enqueue(&mut self, step: OperationStep) {
        self.steps.push_back(step);
    }

    /// Removes and returns the head step.
    pub fn dequeue(&mut self) -> Option<OperationStep> {
        self.steps.pop_front()
    }

    /// Moves every step of `other` after this queue's tail.
    ///
    /// `other` is left empty.
    pub fn append(&mut self, other: &mut Self) {
        self.steps.append(&mut other.steps);
    }

    /// Returns an independent queue with fresh step containers.
    ///
    /// Operation payloads are shared, not duplicated; mutating either queue's
    /// steps afterwards does not affect the other.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            steps: self.steps.iter().cloned().collect(),
        }
    }

    /// Drops every remaining step without running any payload.
    pub fn release(&mut self) {
        self.steps.clear();
    }

    /// The step most recently enqueued, still open for concurrent additions.
    pub fn last_mut(&mut self) -> Option<&mut OperationStep> {
        self.steps.back_mut()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the queue has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates over the steps from head to tail.
    pub fn iter(&self) -> std::collections::linked_list::Iter<'_, OperationStep> {
        self.steps.iter()
    }

    /// Total time needed to drain the queue, or `None` if any step is
    /// unbounded. Saturates at `Duration::MAX`.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_with(None)
    }

    /// Like [`OperationQueue::deadline`], bounding waits built without a
    /// timeout by `default_timeout`.
    #[must_use]
    pub fn deadline_with(&self, default_timeout: Option<Duration>) -> Option<Duration> {
        self.steps.iter().try_fold(Duration::ZERO, |total, step| {
            Some(total.saturating_add(step.deadline_with(default_timeout)?))
        })
    }
}

impl Clone for OperationQueue {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl FromIterator<OperationStep> for OperationQueue {
    fn from_iter<I: IntoIterator<Item = OperationStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Effect, Operation, SideEffect};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn labelled(label: &str) -> OperationStep {
        OperationStep::single(Effect::new(Duration::from_millis(100), || {}).with_label(label))
    }

    fn labels(queue: &OperationQueue) -> Vec<String> {
        queue
            .iter()
            .flat_map(OperationStep::iter)
            .map(|op| match op {
                Operation::Effect(effect) => effect.name().to_string(),
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = OperationQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.dequeue().is_none());
        assert!(queue.last_mut().is_none());
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = OperationQueue::new();
        queue.enqueue(labelled("a"));
        queue.enqueue(labelled("b"));
        queue.enqueue(labelled("c"));

        assert_eq!(labels(&queue), vec!["a", "b", "c"]);

        let first = queue.dequeue().unwrap();
        assert!(matches!(&first.operations()[0], Operation::Effect(e) if e.name() == "a"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_dequeue_last_empties_queue() {
        let mut queue = OperationQueue::new();
        queue.enqueue(labelled("only"));

        assert!(queue.dequeue().is_some());
        assert!(queue.is_empty());
        assert!(queue.last_mut().is_none());

        queue.enqueue(labelled("again"));
        assert_eq!(labels(&queue), vec!["again"]);
    }

    #[test]
    fn test_last_mut_extends_tail_step() {
        let mut queue = OperationQueue::new();
        queue.enqueue(labelled("a"));
        queue.enqueue(labelled("b"));

        queue.last_mut().unwrap().push(SideEffect::new(|| {}));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().last().unwrap().len(), 2);
    }

    #[test]
    fn test_append_moves_steps() {
        let mut queue = OperationQueue::new();
        queue.enqueue(labelled("a"));

        let mut other = OperationQueue::new();
        other.enqueue(labelled("b"));
        other.enqueue(labelled("c"));

        queue.append(&mut other);

        assert_eq!(labels(&queue), vec!["a", "b", "c"]);
        assert!(other.is_empty());
    }

    #[test]
    fn test_append_onto_empty_queue() {
        let mut queue = OperationQueue::new();
        let mut other: OperationQueue = vec![labelled("x"), labelled("y")].into_iter().collect();

        queue.append(&mut other);

        assert_eq!(labels(&queue), vec!["x", "y"]);
        assert!(other.is_empty());

        queue.enqueue(labelled("z"));
        assert_eq!(labels(&queue), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = OperationQueue::new();
        original.enqueue(labelled("a"));
        original.enqueue(labelled("b"));

        let mut copy = original.copy();
        copy.last_mut().unwrap().push(SideEffect::new(|| {}));
        copy.enqueue(labelled("c"));
        original.dequeue();

        assert_eq!(labels(&original), vec!["b"]);
        assert_eq!(labels(&copy), vec!["a", "b", "side_effect", "c"]);
    }

    #[test]
    fn test_copy_shares_payloads() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let mut original = OperationQueue::new();
        original.enqueue(OperationStep::single(SideEffect::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })));
        let copy = original.clone();

        for queue in [&original, &copy] {
            for op in queue.iter().flat_map(OperationStep::iter) {
                if let Operation::SideEffect(side) = op {
                    side.run();
                }
            }
        }

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_runs_nothing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(SideEffect::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })));
        queue.enqueue(labelled("b"));

        queue.release();

        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_queue_deadline_sums_steps() {
        let mut queue = OperationQueue::new();
        queue.enqueue(labelled("a"));
        queue.enqueue(labelled("b"));
        assert_eq!(queue.deadline(), Some(Duration::from_millis(200)));

        queue.enqueue(OperationStep::single(crate::operation::Wait::idle(None)));
        assert_eq!(queue.deadline(), None);
    }
}
