//! Resume protocol for wait operations.
//!
//! This module provides:
//! - ResumeToken, a one-shot guard shared by the resume handle and the timer
//! - Resume, the handle passed to wait bodies
//! - ResumeSource, recording which side completed a wait

mod token;

pub use token::{ResumeCallback, ResumeSource, ResumeToken};

use std::sync::Arc;

/// Handle passed to a wait body.
///
/// Calling [`Resume::resume`] lets the pipeline advance. It may be cloned,
/// moved to other tasks or threads, and called any number of times; only the
/// first call (or the wait's timeout, whichever comes first) has an effect.
#[derive(Debug, Clone)]
pub struct Resume {
    token: Arc<ResumeToken>,
}

impl Resume {
    /// Wraps a token.
    #[must_use]
    pub fn new(token: Arc<ResumeToken>) -> Self {
        Self { token }
    }

    /// Resumes the pipeline.
    ///
    /// Returns `true` when this call completed the wait.
    pub fn resume(&self) -> bool {
        self.token.fire(ResumeSource::Caller)
    }

    /// Returns whether the wait has already completed.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.token.is_fired()
    }
}
