//! Capabilities the scheduler consumes from its environment.
//!
//! This module provides:
//! - EffectRunner, the "run this effect and tell me when it is done" primitive
//! - Timer, used for wait timeouts
//! - Host, the bundle a pipeline carries

mod runner;
mod timer;

pub use runner::{EffectRunner, TimedEffectRunner};
pub use timer::{Timer, TokioTimer};

use crate::events::{EventSink, NoOpEventSink};
use std::sync::Arc;

/// The environment a pipeline runs against.
///
/// Cloning is cheap; clones share the same runner, timer and sink.
#[derive(Debug, Clone)]
pub struct Host {
    /// Runs effects.
    pub runner: Arc<dyn EffectRunner>,
    /// Arms wait timeouts.
    pub timer: Arc<dyn Timer>,
    /// Receives lifecycle events.
    pub events: Arc<dyn EventSink>,
}

impl Host {
    /// Creates a host with the given runner, a tokio timer and no event sink.
    #[must_use]
    pub fn new(runner: Arc<dyn EffectRunner>) -> Self {
        Self {
            runner,
            timer: Arc::new(TokioTimer),
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Replaces the effect runner.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn EffectRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replaces the timer used for wait timeouts.
    ///
    /// The runner keeps whatever timer it was built with.
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }
}

impl Default for Host {
    fn default() -> Self {
        let timer: Arc<dyn Timer> = Arc::new(TokioTimer);
        Self {
            runner: Arc::new(TimedEffectRunner::new(timer.clone())),
            timer,
            events: Arc::new(NoOpEventSink),
        }
    }
}
