//! Queued units of work.
//!
//! This module provides:
//! - Operation, the closed set of things a pipeline can run
//! - OperationStep, a group of operations that run concurrently
//! - OperationQueue, the FIFO of steps a pipeline drains

mod effect;
mod queue;
mod step;

pub use effect::{Curve, Effect, EffectOptions, Keyframe, Motion, Payload};
pub use queue::OperationQueue;
pub use step::OperationStep;

use crate::resume::Resume;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Body of a wait operation. Receives the handle that resumes the pipeline.
pub type WaitBody = Arc<dyn Fn(Resume) + Send + Sync>;

/// A pause until the body resumes or the timeout elapses.
#[derive(Clone)]
pub struct Wait {
    /// Upper bound on the pause. `None` waits for the body indefinitely.
    pub timeout: Option<Duration>,
    body: WaitBody,
}

impl Wait {
    /// Creates a wait.
    pub fn new<F>(timeout: Option<Duration>, body: F) -> Self
    where
        F: Fn(Resume) + Send + Sync + 'static,
    {
        Self {
            timeout,
            body: Arc::new(body),
        }
    }

    /// Creates a wait whose body never resumes.
    ///
    /// Without a timeout this stalls the pipeline forever.
    #[must_use]
    pub fn idle(timeout: Option<Duration>) -> Self {
        Self::new(timeout, |_| {})
    }

    /// Hands `resume` to the body.
    pub fn start(&self, resume: Resume) {
        (self.body)(resume);
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wait")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// An immediate, synchronous action with no duration.
#[derive(Clone)]
pub struct SideEffect {
    body: Payload,
}

impl SideEffect {
    /// Creates a side effect.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Runs the body.
    pub fn run(&self) {
        (self.body)();
    }
}

impl fmt::Debug for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideEffect").finish_non_exhaustive()
    }
}

/// One queued unit of work.
#[derive(Debug, Clone)]
pub enum Operation {
    /// A time-boxed visual change run by the host.
    Effect(Effect),
    /// A pause until resumed or timed out.
    Wait(Wait),
    /// A synchronous action.
    SideEffect(SideEffect),
    /// A nested pipeline's steps, drained as one unit.
    Group(Arc<OperationQueue>),
}

impl Operation {
    /// Short name of the variant, for logs and events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Effect(_) => "effect",
            Self::Wait(_) => "wait",
            Self::SideEffect(_) => "side_effect",
            Self::Group(_) => "group",
        }
    }

    /// Upper bound on how long this operation takes.
    ///
    /// `None` when the operation can wait indefinitely.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_with(None)
    }

    /// Like [`Operation::deadline`], bounding waits built without a timeout
    /// by `default_timeout`.
    #[must_use]
    pub fn deadline_with(&self, default_timeout: Option<Duration>) -> Option<Duration> {
        match self {
            Self::Effect(effect) => Some(effect.span()),
            Self::Wait(wait) => wait.timeout.or(default_timeout),
            Self::SideEffect(_) => Some(Duration::ZERO),
            Self::Group(queue) => queue.deadline_with(default_timeout),
        }
    }
}

impl From<Effect> for Operation {
    fn from(effect: Effect) -> Self {
        Self::Effect(effect)
    }
}

impl From<Wait> for Operation {
    fn from(wait: Wait) -> Self {
        Self::Wait(wait)
    }
}

impl From<SideEffect> for Operation {
    fn from(side_effect: SideEffect) -> Self {
        Self::SideEffect(side_effect)
    }
}

impl From<OperationQueue> for Operation {
    fn from(queue: OperationQueue) -> Self {
        Self::Group(Arc::new(queue))
    }
}
