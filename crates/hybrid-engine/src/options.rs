//! Engine options (hybrid.toml)
//!
//! Everything tunable about the engine's background services. Options can
//! be built in code or parsed from TOML:
//!
//! ```toml
//! frame_interval_ms = 8.0
//! frame_thread_name = "ui-frames"
//! dispatcher_thread_name = "engine-owner"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

fn default_frame_interval_ms() -> f64 {
    1000.0 / 60.0
}

fn default_frame_thread_name() -> String {
    "hybrid-frame-clock".to_string()
}

fn default_dispatcher_thread_name() -> String {
    "hybrid-dispatcher".to_string()
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineOptions {
    /// Tick period of the threaded frame clock, in milliseconds
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,

    /// Name of the frame clock thread
    #[serde(default = "default_frame_thread_name")]
    pub frame_thread_name: String,

    /// Name of the dispatcher thread
    #[serde(default = "default_dispatcher_thread_name")]
    pub dispatcher_thread_name: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            frame_thread_name: default_frame_thread_name(),
            dispatcher_thread_name: default_dispatcher_thread_name(),
        }
    }
}

impl EngineOptions {
    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a TOML string
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let options: EngineOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Check value ranges
    pub fn validate(&self) -> EngineResult<()> {
        if !self.frame_interval_ms.is_finite() || self.frame_interval_ms <= 0.0 {
            return Err(EngineError::Options(format!(
                "frame_interval_ms must be a positive number, got {}",
                self.frame_interval_ms
            )));
        }
        if self.frame_thread_name.is_empty() || self.dispatcher_thread_name.is_empty() {
            return Err(EngineError::Options(
                "thread names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the frame interval
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval_ms = interval.as_secs_f64() * 1000.0;
        self
    }

    /// Set the frame clock thread name
    pub fn with_frame_thread_name(mut self, name: impl Into<String>) -> Self {
        self.frame_thread_name = name.into();
        self
    }

    /// Set the dispatcher thread name
    pub fn with_dispatcher_thread_name(mut self, name: impl Into<String>) -> Self {
        self.dispatcher_thread_name = name.into();
        self
    }

    /// Frame interval as a `Duration`
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.frame_interval_ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert!((options.frame_interval_ms - 16.666).abs() < 0.01);
        assert_eq!(options.frame_thread_name, "hybrid-frame-clock");
        assert_eq!(options.dispatcher_thread_name, "hybrid-dispatcher");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let options = EngineOptions::from_toml_str("frame_interval_ms = 8.0\n").unwrap();
        assert_eq!(options.frame_interval_ms, 8.0);
        assert_eq!(options.frame_interval(), Duration::from_millis(8));
        assert_eq!(options.dispatcher_thread_name, "hybrid-dispatcher");
    }

    #[test]
    fn test_parse_empty_toml() {
        let options = EngineOptions::from_toml_str("").unwrap();
        assert_eq!(options, EngineOptions::default());
    }

    #[test]
    fn test_reject_invalid_interval() {
        let err = EngineOptions::from_toml_str("frame_interval_ms = 0.0").unwrap_err();
        assert!(matches!(err, EngineError::Options(_)));

        let err = EngineOptions::from_toml_str("frame_interval_ms = -4.0").unwrap_err();
        assert!(matches!(err, EngineError::Options(_)));
    }

    #[test]
    fn test_reject_malformed_toml() {
        let err = EngineOptions::from_toml_str("frame_interval_ms = ").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_builder() {
        let options = EngineOptions::default()
            .with_frame_interval(Duration::from_millis(4))
            .with_frame_thread_name("frames")
            .with_dispatcher_thread_name("owner");
        assert!((options.frame_interval_ms - 4.0).abs() < 1e-9);
        assert_eq!(options.frame_thread_name, "frames");
        assert_eq!(options.dispatcher_thread_name, "owner");
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = serde_json::to_value(EngineOptions::default()).unwrap();
        assert!(json.get("frame_interval_ms").is_some());
        assert!(json.get("dispatcher_thread_name").is_some());
    }
}
