//! Time-boxed effects and their host-facing options.

use crate::errors::{checked_secs, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A zero-argument procedure applied by an effect or side effect.
///
/// Payloads are shared between structural copies of a queue, so they must be
/// callable more than once.
pub type Payload = Arc<dyn Fn() + Send + Sync>;

/// Timing curve requested from the host's animation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    /// Slow start.
    EaseIn,
    /// Slow finish.
    EaseOut,
    /// Slow start and finish.
    #[default]
    EaseInOut,
    /// Constant pace.
    Linear,
}

/// Options forwarded to the host alongside an effect.
///
/// The scheduler never interprets these; they only travel with the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectOptions {
    /// Timing curve.
    #[serde(default)]
    pub curve: Curve,
    /// Whether the target stays interactive while the effect runs.
    #[serde(default)]
    pub allow_interaction: bool,
    /// Whether to start from the currently presented state.
    #[serde(default)]
    pub begin_from_current_state: bool,
}

impl EffectOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timing curve.
    #[must_use]
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    /// Allows interaction while the effect runs.
    #[must_use]
    pub fn allow_interaction(mut self) -> Self {
        self.allow_interaction = true;
        self
    }

    /// Starts from the currently presented state.
    #[must_use]
    pub fn begin_from_current_state(mut self) -> Self {
        self.begin_from_current_state = true;
        self
    }
}

/// One keyframe of a keyframe effect.
#[derive(Clone)]
pub struct Keyframe {
    /// Length of the keyframe.
    pub duration: Duration,
    /// Offset of the keyframe from the start of the effect's timeline.
    pub delay: Duration,
    payload: Payload,
}

impl Keyframe {
    /// Creates a keyframe starting at the beginning of the timeline.
    pub fn new<F>(duration: Duration, payload: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            duration,
            delay: Duration::ZERO,
            payload: Arc::new(payload),
        }
    }

    /// Sets the keyframe's offset.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Time at which this keyframe finishes.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// Start of this keyframe as a fraction of the owning effect's duration.
    #[must_use]
    pub fn relative_start(&self, effect_delay: Duration, effect_duration: Duration) -> f64 {
        if effect_duration.is_zero() {
            return 0.0;
        }
        self.delay.saturating_sub(effect_delay).as_secs_f64() / effect_duration.as_secs_f64()
    }

    /// Length of this keyframe as a fraction of the owning effect's duration.
    #[must_use]
    pub fn relative_duration(&self, effect_duration: Duration) -> f64 {
        if effect_duration.is_zero() {
            return 0.0;
        }
        self.duration.as_secs_f64() / effect_duration.as_secs_f64()
    }

    /// Invokes the keyframe's payload.
    pub fn apply(&self) {
        (self.payload)();
    }
}

impl fmt::Debug for Keyframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyframe")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// The kind of motion a host should use for an effect.
#[derive(Debug, Clone)]
pub enum Motion {
    /// A plain timed transition.
    Standard,
    /// A spring transition.
    Spring {
        /// 1.0 settles smoothly, values toward 0.0 oscillate more.
        damping: f64,
        /// Initial velocity relative to the total distance per second.
        initial_velocity: f64,
    },
    /// A sequence of keyframes sharing one timeline.
    Keyframes(Arc<[Keyframe]>),
}

/// A time-boxed visual change.
#[derive(Clone)]
pub struct Effect {
    /// How long the change takes once started.
    pub duration: Duration,
    /// How long to wait before starting.
    pub delay: Duration,
    /// Options forwarded to the host.
    pub options: EffectOptions,
    /// Motion kind.
    pub motion: Motion,
    /// Optional name used in logs and events.
    pub label: Option<String>,
    payload: Payload,
}

impl Effect {
    /// Creates a standard effect with no delay.
    pub fn new<F>(duration: Duration, payload: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_payload(duration, Arc::new(payload))
    }

    /// Creates a standard effect from an already shared payload.
    #[must_use]
    pub fn from_payload(duration: Duration, payload: Payload) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            options: EffectOptions::default(),
            motion: Motion::Standard,
            label: None,
            payload,
        }
    }

    /// Creates a standard effect from seconds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CadenceError::InvalidDuration`] when either value is
    /// negative or not finite.
    pub fn from_secs<F>(duration_secs: f64, delay_secs: f64, payload: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let duration = checked_secs("duration", duration_secs)?;
        let delay = checked_secs("delay", delay_secs)?;
        Ok(Self::new(duration, payload).with_delay(delay))
    }

    /// Creates a keyframe effect.
    ///
    /// The effect starts at the earliest keyframe delay and lasts until the
    /// latest keyframe finishes. Its payload applies every keyframe in order.
    #[must_use]
    pub fn keyframes(frames: Vec<Keyframe>, options: EffectOptions) -> Self {
        let delay = frames.iter().map(|k| k.delay).min().unwrap_or_default();
        let end = frames.iter().map(Keyframe::span).max().unwrap_or_default();
        let frames: Arc<[Keyframe]> = frames.into();

        let applied = Arc::clone(&frames);
        let payload: Payload = Arc::new(move || {
            for frame in applied.iter() {
                frame.apply();
            }
        });

        Self {
            duration: end.saturating_sub(delay),
            delay,
            options,
            motion: Motion::Keyframes(frames),
            label: None,
            payload,
        }
    }

    /// Sets the delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the host options.
    #[must_use]
    pub fn with_options(mut self, options: EffectOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Turns this effect into a spring effect.
    #[must_use]
    pub fn spring(mut self, damping: f64, initial_velocity: f64) -> Self {
        self.motion = Motion::Spring {
            damping,
            initial_velocity,
        };
        self
    }

    /// Time from start of the step until this effect completes.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }

    /// The label, or the motion kind when unlabelled.
    #[must_use]
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(match self.motion {
            Motion::Standard => "standard",
            Motion::Spring { .. } => "spring",
            Motion::Keyframes(_) => "keyframes",
        })
    }

    /// Returns the keyframes of a keyframe effect.
    #[must_use]
    pub fn frames(&self) -> Option<&[Keyframe]> {
        match &self.motion {
            Motion::Keyframes(frames) => Some(&**frames),
            _ => None,
        }
    }

    /// Invokes the payload.
    pub fn apply(&self) {
        (self.payload)();
    }

    /// Returns the shared payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("options", &self.options)
            .field("motion", &self.motion)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
