//! Fluent pipeline builder and its entry points.

use super::executor::Dispatcher;
use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::events;
use crate::host::Host;
use crate::operation::{
    Effect, EffectOptions, Keyframe, Operation, OperationQueue, OperationStep, SideEffect, Wait,
};
use crate::resume::Resume;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

/// A chain of effects, side effects and waits, run with one call.
///
/// Building only records operations. Nothing runs until [`Pipeline::perform`]
/// (or one of the `finish*` methods) drains the queue.
///
/// ```rust,ignore
/// use cadence::prelude::*;
/// use std::time::Duration;
///
/// Pipeline::new()
///     .then(Duration::from_millis(500), || fade_in())
///     .and(Duration::from_millis(500), || slide_up())
///     .then_do(|| log_shown())
///     .wait_timeout(Duration::from_secs(1))
///     .finish(Duration::from_millis(300), || fade_out())
///     .await;
/// ```
///
/// Cloning yields an independent copy of the queued plan: performing one
/// copy leaves the other untouched.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    queue: OperationQueue,
    host: Host,
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates an empty pipeline using the default host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pipeline running against `host`.
    #[must_use]
    pub fn with_host(host: Host) -> Self {
        Self {
            host,
            ..Self::default()
        }
    }

    /// Creates a pipeline whose first step is `effect`.
    #[must_use]
    pub fn from_effect(effect: Effect) -> Self {
        Self::new().then_effect(effect)
    }

    /// Replaces the host.
    #[must_use]
    pub fn host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Replaces the configuration.
    ///
    /// An invalid configuration is logged and kept; its rejected thresholds
    /// read as unset. Use [`Pipeline::try_with_config`] to refuse it instead.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!(
                pipeline = %config.label,
                error = %e,
                "Invalid pipeline configuration; rejected values are ignored"
            );
        }
        self.config = config;
        self
    }

    /// Replaces the configuration after validating it.
    ///
    /// # Errors
    ///
    /// Returns the validation error and leaves the pipeline unchanged.
    pub fn try_with_config(mut self, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Sets the label used in tracing spans and events.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    fn push_step(mut self, operation: impl Into<Operation>) -> Self {
        self.queue.enqueue(OperationStep::single(operation));
        self
    }

    fn push_concurrent(mut self, operation: impl Into<Operation>) -> Self {
        if let Some(step) = self.queue.last_mut() {
            step.push(operation);
        } else {
            self.queue.enqueue(OperationStep::single(operation));
        }
        self
    }

    /// Runs an effect after everything queued so far has completed.
    #[must_use]
    pub fn then<F>(self, duration: Duration, payload: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.then_effect(Effect::new(duration, payload))
    }

    /// Runs `effect` after everything queued so far has completed.
    #[must_use]
    pub fn then_effect(self, effect: Effect) -> Self {
        self.push_step(effect)
    }

    /// Runs a spring effect after everything queued so far has completed.
    #[must_use]
    pub fn then_spring<F>(
        self,
        duration: Duration,
        damping: f64,
        initial_velocity: f64,
        payload: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.then_effect(Effect::new(duration, payload).spring(damping, initial_velocity))
    }

    /// Runs a keyframe effect after everything queued so far has completed.
    #[must_use]
    pub fn then_keyframes(self, frames: Vec<Keyframe>, options: EffectOptions) -> Self {
        self.then_effect(Effect::keyframes(frames, options))
    }

    /// Runs an effect alongside the most recently queued step.
    ///
    /// On an empty pipeline this behaves like [`Pipeline::then`].
    #[must_use]
    pub fn and<F>(self, duration: Duration, payload: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.and_effect(Effect::new(duration, payload))
    }

    /// Runs `effect` alongside the most recently queued step.
    #[must_use]
    pub fn and_effect(self, effect: Effect) -> Self {
        self.push_concurrent(effect)
    }

    /// Runs a spring effect alongside the most recently queued step.
    #[must_use]
    pub fn and_spring<F>(
        self,
        duration: Duration,
        damping: f64,
        initial_velocity: f64,
        payload: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.and_effect(Effect::new(duration, payload).spring(damping, initial_velocity))
    }

    /// Runs a keyframe effect alongside the most recently queued step.
    #[must_use]
    pub fn and_keyframes(self, frames: Vec<Keyframe>, options: EffectOptions) -> Self {
        self.and_effect(Effect::keyframes(frames, options))
    }

    /// Pauses until `body` calls its resume handle or `timeout` elapses.
    ///
    /// With no timeout, a body that never resumes stalls the pipeline (and
    /// its completion) forever.
    #[must_use]
    pub fn wait<F>(self, timeout: Option<Duration>, body: F) -> Self
    where
        F: Fn(Resume) + Send + Sync + 'static,
    {
        self.push_step(Wait::new(timeout, body))
    }

    /// Pauses for `timeout`.
    #[must_use]
    pub fn wait_timeout(self, timeout: Duration) -> Self {
        self.push_step(Wait::idle(Some(timeout)))
    }

    /// Pauses forever. Nothing queued after this runs unless the
    /// configuration sets a default wait timeout.
    #[must_use]
    pub fn wait_forever(self) -> Self {
        self.push_step(Wait::idle(None))
    }

    /// Runs `body` synchronously between the surrounding steps.
    #[must_use]
    pub fn then_do<F>(self, body: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.push_step(SideEffect::new(body))
    }

    /// Runs all of `child`'s steps as one step after everything queued so
    /// far. `child` is left empty.
    #[must_use]
    pub fn then_pipeline(self, child: &mut Self) -> Self {
        match child.take_group() {
            Some(group) => self.push_step(group),
            None => self,
        }
    }

    /// Runs all of `child`'s steps alongside the most recently queued step.
    /// `child` is left empty.
    #[must_use]
    pub fn and_pipeline(self, child: &mut Self) -> Self {
        match child.take_group() {
            Some(group) => self.push_concurrent(group),
            None => self,
        }
    }

    /// Splices `child`'s steps onto the end of this pipeline's queue.
    ///
    /// Unlike [`Pipeline::then_pipeline`] the steps are not grouped, so a
    /// later [`Pipeline::and`] joins the child's last step. `child` is left
    /// empty.
    #[must_use]
    pub fn append(mut self, child: &mut Self) -> Self {
        self.queue.append(&mut child.queue);
        self
    }

    fn take_group(&mut self) -> Option<Operation> {
        if self.queue.is_empty() {
            return None;
        }
        Some(Operation::Group(Arc::new(std::mem::take(&mut self.queue))))
    }

    /// Discards every queued step without running it.
    ///
    /// A later [`Pipeline::perform`] completes immediately.
    pub fn decay(&mut self) {
        let dropped = self.queue.len();
        self.queue.release();

        debug!(pipeline = %self.config.label, dropped, "Pipeline decayed");
        if self.config.emit_events {
            self.host.events.try_emit(
                events::PIPELINE_DECAYED,
                Some(serde_json::json!({
                    "pipeline": &self.config.label,
                    "dropped": dropped,
                })),
            );
        }
    }

    /// Runs every queued step in order and returns once the last completes.
    ///
    /// An empty pipeline completes immediately. The queue is empty afterwards,
    /// so performing again is a no-op.
    pub async fn perform(&mut self) {
        let span = info_span!("pipeline", label = %self.config.label);
        let dispatcher = Dispatcher::new(self.host.clone(), Arc::new(self.config.clone()));
        dispatcher.run(&mut self.queue).instrument(span).await;
    }

    /// Runs the pipeline, then calls `completion` exactly once.
    pub async fn perform_then<F>(&mut self, completion: F)
    where
        F: FnOnce(),
    {
        self.perform().await;
        completion();
    }

    /// Runs the pipeline on the tokio runtime and calls `completion` once it
    /// has drained.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(mut self, completion: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        tokio::spawn(async move {
            self.perform().await;
            completion();
        })
    }

    /// Runs the pipeline on its own tokio task and waits for it.
    ///
    /// A panicking payload aborts only that task.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::Join`](crate::CadenceError::Join) if the task panicked or was cancelled.
    pub async fn perform_detached(self) -> Result<()> {
        self.spawn(|| {}).await?;
        Ok(())
    }

    /// Queues a final effect and runs the pipeline.
    pub async fn finish<F>(self, duration: Duration, payload: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.finish_effect(Effect::new(duration, payload)).await;
    }

    /// Queues a final `effect` and runs the pipeline.
    pub async fn finish_effect(self, effect: Effect) {
        self.then_effect(effect).perform().await;
    }

    /// Queues `child` as the final step and runs the pipeline. `child` is
    /// left empty.
    pub async fn finish_pipeline(self, child: &mut Self) {
        self.then_pipeline(child).perform().await;
    }

    /// Returns the number of queued steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the queued steps.
    #[must_use]
    pub fn queue(&self) -> &OperationQueue {
        &self.queue
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Upper bound on how long performing would take, assuming effects run
    /// for exactly their delay plus duration.
    ///
    /// Waits without a timeout are bounded by the configured default wait
    /// timeout; `None` if any of them remains unbounded.
    #[must_use]
    pub fn estimated_duration(&self) -> Option<Duration> {
        self.queue.deadline_with(self.config.default_wait_timeout())
    }
}
