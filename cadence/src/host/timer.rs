//! Timer capability.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Schedules wake-ups. Used for wait timeouts and effect delays.
#[async_trait]
pub trait Timer: Send + Sync + Debug {
    /// Completes once `duration` has elapsed.
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio runtime clock.
///
/// Honours `tokio::time::pause`, so tests can drive it with virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
