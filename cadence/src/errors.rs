//! Error types for the cadence crate.
//!
//! The scheduling core has no error channel: effects, waits and side effects
//! either complete or stall. Errors only surface while constructing effects
//! from raw seconds, validating configuration, or joining a spawned drain.

use std::collections::HashMap;
use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, CadenceError>;

/// The main error type for cadence operations.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// A duration, delay or timeout was negative or not finite.
    #[error("Invalid {field}: {seconds}s (must be finite and non-negative)")]
    InvalidDuration {
        /// Which value was rejected (e.g. "duration", "delay").
        field: &'static str,
        /// The rejected value in seconds.
        seconds: f64,
    },

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A spawned pipeline task could not be joined.
    #[error("Pipeline task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CadenceError {
    /// Creates an invalid duration error.
    #[must_use]
    pub fn invalid_duration(field: &'static str, seconds: f64) -> Self {
        Self::InvalidDuration { field, seconds }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::InvalidDuration { field, seconds } => {
                map.insert("type".to_string(), serde_json::json!("InvalidDuration"));
                map.insert("field".to_string(), serde_json::json!(field));
                map.insert("seconds".to_string(), serde_json::json!(seconds));
            }
            Self::InvalidConfig(_) => {
                map.insert("type".to_string(), serde_json::json!("InvalidConfig"));
            }
            Self::Join(_) => {
                map.insert("type".to_string(), serde_json::json!("Join"));
            }
            Self::Serialization(_) => {
                map.insert("type".to_string(), serde_json::json!("Serialization"));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Converts seconds into a [`std::time::Duration`], rejecting negative,
/// NaN and infinite values.
pub fn checked_secs(field: &'static str, seconds: f64) -> Result<std::time::Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CadenceError::invalid_duration(field, seconds));
    }
    std::time::Duration::try_from_secs_f64(seconds)
        .map_err(|_| CadenceError::invalid_duration(field, seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_checked_secs_accepts_zero_and_positive() {
        assert_eq!(checked_secs("delay", 0.0).unwrap(), Duration::ZERO);
        assert_eq!(
            checked_secs("duration", 0.5).unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_checked_secs_rejects_negative_and_nan() {
        let err = checked_secs("duration", -1.0).unwrap_err();
        assert!(matches!(
            err,
            CadenceError::InvalidDuration { field: "duration", .. }
        ));
        assert!(checked_secs("timeout", f64::NAN).is_err());
        assert!(checked_secs("timeout", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_to_dict() {
        let err = CadenceError::invalid_duration("delay", -0.25);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "InvalidDuration");
        assert_eq!(dict.get("field").unwrap(), "delay");
        assert!(dict
            .get("message")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("-0.25"));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = CadenceError::invalid_config("stall warning must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stall warning must be positive"
        );
    }
}
