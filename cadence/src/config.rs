//! Pipeline configuration.

use crate::errors::{checked_secs, CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name used in tracing spans and events.
    #[serde(default = "default_label")]
    pub label: String,
    /// Log a warning when a wait without timeout has not resumed after this
    /// many seconds. The wait keeps waiting.
    #[serde(default)]
    pub stall_warning_seconds: Option<f64>,
    /// Timeout applied to waits built without one. Opt-in; unset means such
    /// waits can stall forever.
    #[serde(default)]
    pub default_wait_timeout_seconds: Option<f64>,
    /// Whether lifecycle events are sent to the host's event sink.
    #[serde(default = "default_emit_events")]
    pub emit_events: bool,
}

fn default_label() -> String {
    "pipeline".to_string()
}

fn default_emit_events() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            stall_warning_seconds: None,
            default_wait_timeout_seconds: None,
            emit_events: default_emit_events(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the stall warning threshold.
    #[must_use]
    pub fn with_stall_warning(mut self, seconds: f64) -> Self {
        self.stall_warning_seconds = Some(seconds);
        self
    }

    /// Sets the timeout applied to waits built without one.
    #[must_use]
    pub fn with_default_wait_timeout(mut self, seconds: f64) -> Self {
        self.default_wait_timeout_seconds = Some(seconds);
        self
    }

    /// Disables lifecycle events.
    #[must_use]
    pub fn without_events(mut self) -> Self {
        self.emit_events = false;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty label or a negative, zero or non-finite
    /// threshold.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(CadenceError::invalid_config("label must not be empty"));
        }
        for (field, value) in [
            ("stall_warning_seconds", self.stall_warning_seconds),
            ("default_wait_timeout_seconds", self.default_wait_timeout_seconds),
        ] {
            if let Some(seconds) = value {
                checked_secs(field, seconds)?;
                if seconds == 0.0 {
                    return Err(CadenceError::invalid_config(format!(
                        "{field} must be greater than zero"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Gets the stall warning threshold as a Duration.
    ///
    /// Invalid values are treated as unset.
    #[must_use]
    pub fn stall_warning(&self) -> Option<Duration> {
        self.stall_warning_seconds
            .and_then(|s| checked_secs("stall_warning_seconds", s).ok())
            .filter(|d| !d.is_zero())
    }

    /// Gets the default wait timeout as a Duration.
    ///
    /// Invalid values, zero included, are treated as unset.
    #[must_use]
    pub fn default_wait_timeout(&self) -> Option<Duration> {
        self.default_wait_timeout_seconds
            .and_then(|s| checked_secs("default_wait_timeout_seconds", s).ok())
            .filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.label, "pipeline");
        assert!(config.stall_warning().is_none());
        assert!(config.default_wait_timeout().is_none());
        assert!(config.emit_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::new()
            .with_label("intro")
            .with_stall_warning(5.0)
            .with_default_wait_timeout(1.5)
            .without_events();

        assert_eq!(config.label, "intro");
        assert_eq!(config.stall_warning(), Some(Duration::from_secs(5)));
        assert_eq!(config.default_wait_timeout(), Some(Duration::from_millis(1500)));
        assert!(!config.emit_events);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::new().with_label("  ").validate().is_err());
        assert!(PipelineConfig::new().with_stall_warning(-1.0).validate().is_err());
        assert!(PipelineConfig::new().with_stall_warning(0.0).validate().is_err());
        assert!(PipelineConfig::new()
            .with_default_wait_timeout(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_values_read_as_unset() {
        let config = PipelineConfig::new().with_default_wait_timeout(-2.0);
        assert!(config.default_wait_timeout().is_none());

        let config = PipelineConfig::new()
            .with_default_wait_timeout(0.0)
            .with_stall_warning(0.0);
        assert!(config.validate().is_err());
        assert!(config.default_wait_timeout().is_none());
        assert!(config.stall_warning().is_none());
    }

    #[test]
    fn test_from_json_uses_defaults() {
        let config = PipelineConfig::from_json(r#"{"stall_warning_seconds": 2.0}"#).unwrap();
        assert_eq!(config.label, "pipeline");
        assert_eq!(config.stall_warning(), Some(Duration::from_secs(2)));
        assert!(config.emit_events);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            PipelineConfig::from_json("{not json"),
            Err(CadenceError::Serialization(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{"default_wait_timeout_seconds": -1.0}"#),
            Err(CadenceError::InvalidDuration { .. })
        ));
    }
}
