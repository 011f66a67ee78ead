//! # Cadence
//!
//! Fluent sequencing of timed visual effects, synchronous side effects and
//! resumable waits.
//!
//! A [`Pipeline`](pipeline::Pipeline) is built as a chain of steps. Each step
//! holds one or more operations that run together; the next step starts only
//! once every operation of the current one has completed:
//!
//! - **Effects**: timed changes handed to the host's
//!   [`EffectRunner`](host::EffectRunner) (standard, spring or keyframes)
//! - **Side effects**: plain closures, run in order between steps
//! - **Waits**: pauses that end when their body calls
//!   [`Resume::resume`](resume::Resume::resume) or their timeout elapses
//! - **Groups**: whole pipelines nested as a single step
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence::prelude::*;
//! use std::time::Duration;
//!
//! let mut pipeline = Pipeline::new()
//!     .then(Duration::from_millis(300), || show_banner())
//!     .and(Duration::from_millis(300), || dim_background())
//!     .wait(Some(Duration::from_secs(5)), |resume| on_tap(move || resume.resume()))
//!     .then(Duration::from_millis(300), || hide_banner());
//!
//! pipeline.perform_then(|| println!("done")).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod host;
pub mod observability;
pub mod operation;
pub mod pipeline;
pub mod resume;
pub mod testing;

pub use errors::{CadenceError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::errors::{CadenceError, Result};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::host::{EffectRunner, Host, TimedEffectRunner, Timer, TokioTimer};
    pub use crate::operation::{
        Curve, Effect, EffectOptions, Keyframe, Motion, Operation, OperationQueue, OperationStep,
        SideEffect, Wait,
    };
    pub use crate::pipeline::Pipeline;
    pub use crate::resume::{Resume, ResumeSource};
}
