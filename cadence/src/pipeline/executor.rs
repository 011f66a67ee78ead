//! Step-by-step execution of an operation queue.

use crate::config::PipelineConfig;
use crate::events;
use crate::host::Host;
use crate::operation::{Effect, Operation, OperationQueue, OperationStep, Wait};
use crate::resume::{Resume, ResumeSource, ResumeToken};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Drains queues against a host.
///
/// One dispatcher serves a whole perform call; nested groups get a copy with
/// a larger depth.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    host: Host,
    config: Arc<PipelineConfig>,
    depth: usize,
}

impl Dispatcher {
    pub(crate) fn new(host: Host, config: Arc<PipelineConfig>) -> Self {
        Self {
            host,
            config,
            depth: 0,
        }
    }

    fn nested(&self) -> Self {
        Self {
            host: self.host.clone(),
            config: self.config.clone(),
            depth: self.depth + 1,
        }
    }

    pub(crate) fn emit(&self, event_type: &str, data: serde_json::Value) {
        if self.config.emit_events {
            self.host.events.try_emit(event_type, Some(data));
        }
    }

    /// Drains `queue` as a top-level pipeline, bracketed by lifecycle events.
    pub(crate) async fn run(&self, queue: &mut OperationQueue) {
        let start = Instant::now();
        let steps = queue.len();

        debug!(pipeline = %self.config.label, steps, "Pipeline started");
        self.emit(
            events::PIPELINE_STARTED,
            serde_json::json!({
                "pipeline": &self.config.label,
                "steps": steps,
            }),
        );

        let completed = self.drain(queue).await;

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(pipeline = %self.config.label, steps = completed, duration_ms, "Pipeline completed");
        self.emit(
            events::PIPELINE_COMPLETED,
            serde_json::json!({
                "pipeline": &self.config.label,
                "steps": completed,
                "duration_ms": duration_ms,
            }),
        );
    }

    /// Dequeues and runs steps until the queue is empty.
    ///
    /// Returns the number of steps run.
    async fn drain(&self, queue: &mut OperationQueue) -> usize {
        let mut index = 0;
        while let Some(step) = queue.dequeue() {
            self.run_step(index, step).await;
            index += 1;
        }
        index
    }

    /// Starts every operation of `step` and waits for all of them.
    ///
    /// Side effects and wait bodies run during dispatch, before anything in
    /// the step suspends.
    async fn run_step(&self, index: usize, step: OperationStep) {
        let deadline_ms = step
            .deadline_with(self.config.default_wait_timeout())
            .map(|d| d.as_secs_f64() * 1000.0);
        trace!(
            pipeline = %self.config.label,
            depth = self.depth,
            step = index,
            operations = step.len(),
            ?deadline_ms,
            "Dispatching step"
        );
        self.emit(
            events::STEP_STARTED,
            serde_json::json!({
                "pipeline": &self.config.label,
                "depth": self.depth,
                "index": index,
                "operations": step.len(),
                "deadline_ms": deadline_ms,
            }),
        );

        let mut pending: Vec<BoxFuture<'_, ()>> = Vec::with_capacity(step.len());
        for operation in &step {
            match operation {
                Operation::SideEffect(side_effect) => side_effect.run(),
                Operation::Effect(effect) => pending.push(self.run_effect(effect).boxed()),
                Operation::Wait(wait) => pending.push(self.start_wait(index, wait)),
                Operation::Group(queue) => pending.push(self.run_group(queue)),
            }
        }
        join_all(pending).await;

        self.emit(
            events::STEP_COMPLETED,
            serde_json::json!({
                "pipeline": &self.config.label,
                "depth": self.depth,
                "index": index,
            }),
        );
    }

    async fn run_effect(&self, effect: &Effect) {
        trace!(
            effect = effect.name(),
            duration_ms = effect.duration.as_secs_f64() * 1000.0,
            delay_ms = effect.delay.as_secs_f64() * 1000.0,
            "Running effect"
        );
        if !self.host.runner.run_effect(effect).await {
            debug!(effect = effect.name(), "Effect reported it did not finish");
        }
    }

    /// Hands the wait body its resume handle and returns the future that
    /// completes once the token fires.
    fn start_wait(&self, index: usize, wait: &Wait) -> BoxFuture<'_, ()> {
        let (tx, rx) = oneshot::channel();
        let token = ResumeToken::new(move |source| {
            let _ = tx.send(source);
        });
        let timeout = wait.timeout.or_else(|| self.config.default_wait_timeout());

        wait.start(Resume::new(token.clone()));

        async move {
            let source = self.await_resume(&token, rx, timeout).await;
            trace!(pipeline = %self.config.label, step = index, %source, "Wait resumed");
            self.emit(
                events::WAIT_RESUMED,
                serde_json::json!({
                    "pipeline": &self.config.label,
                    "depth": self.depth,
                    "index": index,
                    "source": source.as_str(),
                }),
            );
        }
        .boxed()
    }

    /// Waits for the token to fire, arming the timeout if there is one.
    ///
    /// `token` keeps the sender alive, so `rx` only resolves once fired.
    async fn await_resume(
        &self,
        token: &ResumeToken,
        mut rx: oneshot::Receiver<ResumeSource>,
        timeout: Option<Duration>,
    ) -> ResumeSource {
        if let Some(limit) = timeout {
            return tokio::select! {
                biased;
                source = &mut rx => source.unwrap_or(ResumeSource::Caller),
                () = self.host.timer.sleep(limit) => {
                    token.fire(ResumeSource::Timeout);
                    token.fired_by().unwrap_or(ResumeSource::Timeout)
                }
            };
        }

        if let Some(threshold) = self.config.stall_warning() {
            tokio::select! {
                biased;
                source = &mut rx => return source.unwrap_or(ResumeSource::Caller),
                () = self.host.timer.sleep(threshold) => {
                    warn!(
                        pipeline = %self.config.label,
                        waited_ms = threshold.as_secs_f64() * 1000.0,
                        "Wait without timeout has not been resumed; the pipeline stalls until it is"
                    );
                }
            }
        }

        rx.await.unwrap_or(ResumeSource::Caller)
    }

    /// Drains a fresh copy of a nested queue, leaving the shared plan intact.
    fn run_group(&self, queue: &OperationQueue) -> BoxFuture<'static, ()> {
        let mut queue = queue.copy();
        let nested = self.nested();
        async move {
            nested.drain(&mut queue).await;
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::operation::SideEffect;
    use parking_lot::Mutex;

    fn dispatcher(config: PipelineConfig) -> (Dispatcher, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let host = Host::default().with_events(sink.clone());
        (Dispatcher::new(host, Arc::new(config)), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_empty_queue_emits_bracketing_events() {
        let (dispatcher, sink) = dispatcher(PipelineConfig::default());
        let mut queue = OperationQueue::new();

        dispatcher.run(&mut queue).await;

        assert_eq!(
            sink.event_types(),
            vec![events::PIPELINE_STARTED, events::PIPELINE_COMPLETED]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_disabled() {
        let (dispatcher, sink) = dispatcher(PipelineConfig::default().without_events());
        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(SideEffect::new(|| {})));

        dispatcher.run(&mut queue).await;

        assert!(sink.is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_timeout_records_source() {
        let (dispatcher, sink) = dispatcher(PipelineConfig::default());
        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(Wait::idle(Some(Duration::from_secs(1)))));

        let start = Instant::now();
        dispatcher.run(&mut queue).await;

        assert_eq!(start.elapsed(), Duration::from_secs(1));
        let resumed = sink.events_of_type(events::WAIT_RESUMED);
        assert_eq!(resumed.len(), 1);
        assert_eq!(resumed[0].1.as_ref().unwrap()["source"], "timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_resume_records_caller() {
        let (dispatcher, sink) = dispatcher(PipelineConfig::default());
        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(Wait::new(
            Some(Duration::from_secs(5)),
            |resume| {
                resume.resume();
            },
        )));

        let start = Instant::now();
        dispatcher.run(&mut queue).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        let resumed = sink.events_of_type(events::WAIT_RESUMED);
        assert_eq!(resumed[0].1.as_ref().unwrap()["source"], "caller");
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_wait_timeout_applies_to_unbounded_wait() {
        let (dispatcher, _sink) =
            dispatcher(PipelineConfig::default().with_default_wait_timeout(0.25));
        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(Wait::idle(None)));

        let start = Instant::now();
        dispatcher.run(&mut queue).await;

        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_warning_keeps_waiting() {
        let (dispatcher, _sink) = dispatcher(PipelineConfig::default().with_stall_warning(1.0));
        let handle = Arc::new(Mutex::new(None));
        let handle_clone = handle.clone();

        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(Wait::new(None, move |resume| {
            *handle_clone.lock() = Some(resume);
        })));

        let resumer = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            if let Some(resume) = resumer.lock().take() {
                resume.resume();
            }
        });

        let start = Instant::now();
        dispatcher.run(&mut queue).await;

        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_group_runs_copy_of_nested_queue() {
        let (dispatcher, sink) = dispatcher(PipelineConfig::default());
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();

        let mut nested = OperationQueue::new();
        nested.enqueue(OperationStep::single(SideEffect::new(move || {
            *count_clone.lock() += 1;
        })));
        let group = Arc::new(nested);

        let mut queue = OperationQueue::new();
        queue.enqueue(OperationStep::single(Operation::Group(group.clone())));
        queue.enqueue(OperationStep::single(Operation::Group(group.clone())));

        dispatcher.run(&mut queue).await;

        assert_eq!(*count.lock(), 2);
        assert_eq!(group.len(), 1);
        let nested_steps = sink
            .events_of_type(events::STEP_STARTED)
            .into_iter()
            .filter(|(_, data)| data.as_ref().unwrap()["depth"] == 1)
            .count();
        assert_eq!(nested_steps, 2);
    }
}
