//! One-shot resume token.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which side completed a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    /// The wait body called its resume handle.
    Caller,
    /// The wait's timeout elapsed first.
    Timeout,
}

impl ResumeSource {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ResumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback run by the first firing of a token.
pub type ResumeCallback = Box<dyn FnOnce(ResumeSource) + Send>;

struct TokenState {
    callback: Option<ResumeCallback>,
    fired_by: Option<ResumeSource>,
}

/// A one-shot completion guard.
///
/// Firing is idempotent: the first caller runs the backing callback and every
/// later call, whether from a resume handle or a timer, is a no-op.
pub struct ResumeToken {
    state: Mutex<TokenState>,
}

impl ResumeToken {
    /// Creates a token backed by `callback`.
    #[must_use]
    pub fn new<F>(callback: F) -> Arc<Self>
    where
        F: FnOnce(ResumeSource) + Send + 'static,
    {
        Arc::new(Self {
            state: Mutex::new(TokenState {
                callback: Some(Box::new(callback)),
                fired_by: None,
            }),
        })
    }

    /// Fires the token.
    ///
    /// Returns `true` when this call won and ran the callback.
    pub fn fire(&self, source: ResumeSource) -> bool {
        let callback = {
            let mut state = self.state.lock();
            if state.fired_by.is_some() {
                return false;
            }
            state.fired_by = Some(source);
            state.callback.take()
        };

        // Run outside the lock so the callback may touch the token.
        if let Some(callback) = callback {
            callback(source);
        }
        true
    }

    /// Returns whether the token has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.state.lock().fired_by.is_some()
    }

    /// Returns which side fired the token, if any.
    #[must_use]
    pub fn fired_by(&self) -> Option<ResumeSource> {
        self.state.lock().fired_by
    }
}

impl fmt::Debug for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeToken")
            .field("fired_by", &self.fired_by())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_token() -> (Arc<ResumeToken>, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let token = ResumeToken::new(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        (token, counter)
    }

    #[test]
    fn test_token_starts_unfired() {
        let (token, counter) = counting_token();
        assert!(!token.is_fired());
        assert!(token.fired_by().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_token_fires_once() {
        let (token, counter) = counting_token();

        assert!(token.fire(ResumeSource::Caller));
        assert!(!token.fire(ResumeSource::Caller));
        assert!(!token.fire(ResumeSource::Timeout));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(token.fired_by(), Some(ResumeSource::Caller));
    }

    #[test]
    fn test_first_caller_wins() {
        let (token, _counter) = counting_token();

        token.fire(ResumeSource::Timeout);
        token.fire(ResumeSource::Caller);

        assert_eq!(token.fired_by(), Some(ResumeSource::Timeout));
    }

    #[test]
    fn test_callback_receives_source() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let token = ResumeToken::new(move |source| {
            *seen_clone.lock() = Some(source);
        });

        token.fire(ResumeSource::Timeout);

        assert_eq!(*seen.lock(), Some(ResumeSource::Timeout));
    }

    #[test]
    fn test_concurrent_fire_runs_callback_once() {
        let (token, counter) = counting_token();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let token = token.clone();
                std::thread::spawn(move || token.fire(ResumeSource::Caller))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ResumeSource::Caller.to_string(), "caller");
        assert_eq!(
            serde_json::to_string(&ResumeSource::Timeout).unwrap(),
            "\"timeout\""
        );
    }
}
