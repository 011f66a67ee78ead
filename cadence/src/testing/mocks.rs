//! Recorders and mock runners for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::host::{EffectRunner, TimedEffectRunner};
use crate::operation::Effect;

/// One recorded entry: a label and the time it was recorded, relative to
/// the trace's creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// What happened.
    pub label: String,
    /// When it happened.
    pub at: Duration,
}

/// Ordered, shareable event recorder.
///
/// Clones append to the same log. Timestamps come from tokio's clock, so
/// under paused time they are exact.
#[derive(Debug, Clone)]
pub struct Trace {
    origin: Instant,
    entries: Arc<Mutex<Vec<TraceEntry>>>,
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

impl Trace {
    /// Creates an empty trace starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Records `label` at the current time.
    pub fn record(&self, label: impl Into<String>) {
        let at = self.origin.elapsed();
        self.entries.lock().push(TraceEntry {
            label: label.into(),
            at,
        });
    }

    /// Returns a closure that records `label` each time it is called.
    ///
    /// Convenient as an effect payload or side-effect body.
    #[must_use]
    pub fn recorder(&self, label: &str) -> impl Fn() + Send + Sync + 'static {
        let trace = self.clone();
        let label = label.to_string();
        move || trace.record(label.clone())
    }

    /// Returns the recorded labels in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.label.clone()).collect()
    }

    /// Returns all entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.lock().clone()
    }

    /// Returns the time `label` was first recorded.
    #[must_use]
    pub fn time_of(&self, label: &str) -> Option<Duration> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.at)
    }

    /// Returns the position of the first `label`.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e.label == label)
    }

    /// Returns how many times `label` was recorded.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.entries.lock().iter().filter(|e| e.label == label).count()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clears the log.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// An effect runner that records `start:<name>` and `finish:<name>` around
/// each effect.
///
/// In instant mode payloads are applied and the effect completes without
/// yielding. In timed mode it delegates to [`TimedEffectRunner`].
#[derive(Debug)]
pub struct RecordingRunner {
    trace: Trace,
    timed: Option<TimedEffectRunner>,
    runs: Mutex<usize>,
}

impl RecordingRunner {
    /// Creates a runner that completes every effect immediately.
    #[must_use]
    pub fn instant(trace: Trace) -> Self {
        Self {
            trace,
            timed: None,
            runs: Mutex::new(0),
        }
    }

    /// Creates a runner that honours delays and durations on tokio's clock.
    #[must_use]
    pub fn timed(trace: Trace) -> Self {
        Self {
            trace,
            timed: Some(TimedEffectRunner::default()),
            runs: Mutex::new(0),
        }
    }

    /// Returns the number of effects run so far.
    #[must_use]
    pub fn run_count(&self) -> usize {
        *self.runs.lock()
    }

    /// Returns the shared trace.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

#[async_trait]
impl EffectRunner for RecordingRunner {
    async fn run_effect(&self, effect: &Effect) -> bool {
        *self.runs.lock() += 1;
        self.trace.record(format!("start:{}", effect.name()));
        let finished = match &self.timed {
            Some(runner) => runner.run_effect(effect).await,
            None => {
                effect.apply();
                true
            }
        };
        self.trace.record(format!("finish:{}", effect.name()));
        finished
    }
}
