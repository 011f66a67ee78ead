//! Hosts wired for testing.

use std::sync::Arc;

use super::{RecordingRunner, Trace};
use crate::events::CollectingEventSink;
use crate::host::Host;

/// A host whose effects and events are both observable.
#[derive(Debug, Clone)]
pub struct TestHost {
    /// The host to hand to a pipeline.
    pub host: Host,
    /// Effect starts, finishes and any payloads that record into it.
    pub trace: Trace,
    /// The runner behind `host`.
    pub runner: Arc<RecordingRunner>,
    /// Lifecycle events.
    pub events: Arc<CollectingEventSink>,
}

impl TestHost {
    /// Effects complete immediately.
    #[must_use]
    pub fn instant() -> Self {
        let trace = Trace::new();
        Self::with_runner(trace.clone(), RecordingRunner::instant(trace))
    }

    /// Effects honour their delay and duration on tokio's clock.
    #[must_use]
    pub fn timed() -> Self {
        let trace = Trace::new();
        Self::with_runner(trace.clone(), RecordingRunner::timed(trace))
    }

    fn with_runner(trace: Trace, runner: RecordingRunner) -> Self {
        let runner = Arc::new(runner);
        let events = Arc::new(CollectingEventSink::new());
        let host = Host::new(runner.clone()).with_events(events.clone());
        Self {
            host,
            trace,
            runner,
            events,
        }
    }
}
