//! Event sink system for observability.
//!
//! Pipelines report their lifecycle (`pipeline.started`, `step.started`,
//! `step.completed`, `wait.resumed`, `pipeline.completed`,
//! `pipeline.decayed`) to the sink held by their [`crate::host::Host`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// Event emitted when a drain begins.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// Event emitted when a drain finishes.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// Event emitted when queued steps are discarded.
pub const PIPELINE_DECAYED: &str = "pipeline.decayed";
/// Event emitted when a step is dispatched.
pub const STEP_STARTED: &str = "step.started";
/// Event emitted when every operation of a step has completed.
pub const STEP_COMPLETED: &str = "step.completed";
/// Event emitted when a wait completes.
pub const WAIT_RESUMED: &str = "wait.resumed";
