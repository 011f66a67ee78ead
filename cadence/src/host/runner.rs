//! Effect runner capability.

use super::{Timer, TokioTimer};
use crate::operation::{Effect, Motion};
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt::Debug;
use std::sync::Arc;

/// Executes a visual change on behalf of the scheduler.
///
/// The scheduler never inspects the payload. It only awaits completion.
#[async_trait]
pub trait EffectRunner: Send + Sync + Debug {
    /// Runs `effect` and resolves when it has finished.
    ///
    /// Returns whether the effect ran to completion.
    async fn run_effect(&self, effect: &Effect) -> bool;
}

/// Reference runner that applies payloads on a timer.
///
/// Waits for the delay, applies the payload, then waits for the duration.
/// Keyframes are applied at the effect's delay plus their offset from the
/// earliest keyframe. A zero delay applies the payload without yielding to
/// the scheduler.
#[derive(Debug, Clone)]
pub struct TimedEffectRunner {
    timer: Arc<dyn Timer>,
}

impl TimedEffectRunner {
    /// Creates a runner driven by `timer`.
    #[must_use]
    pub fn new(timer: Arc<dyn Timer>) -> Self {
        Self { timer }
    }
}

impl Default for TimedEffectRunner {
    fn default() -> Self {
        Self::new(Arc::new(TokioTimer))
    }
}

#[async_trait]
impl EffectRunner for TimedEffectRunner {
    async fn run_effect(&self, effect: &Effect) -> bool {
        match &effect.motion {
            Motion::Standard | Motion::Spring { .. } => {
                if !effect.delay.is_zero() {
                    self.timer.sleep(effect.delay).await;
                }
                effect.apply();
                if !effect.duration.is_zero() {
                    self.timer.sleep(effect.duration).await;
                }
            }
            Motion::Keyframes(frames) => {
                // Frame offsets are measured from the earliest frame, which
                // starts at the effect's own delay.
                let first = frames.iter().map(|k| k.delay).min().unwrap_or_default();
                if !effect.delay.is_zero() {
                    self.timer.sleep(effect.delay).await;
                }
                let timer = &self.timer;
                let frames = join_all(frames.iter().map(|frame| async move {
                    let offset = frame.delay.saturating_sub(first);
                    if !offset.is_zero() {
                        timer.sleep(offset).await;
                    }
                    frame.apply();
                }));
                let duration = effect.duration;
                let end = async move {
                    if !duration.is_zero() {
                        timer.sleep(duration).await;
                    }
                };
                futures::join!(frames, end);
            }
        }
        true
    }
}
