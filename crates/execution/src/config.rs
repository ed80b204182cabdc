//! Decorating executor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`DecoratingExecutor`](crate::DecoratingExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Name recorded on the executor's log span
    pub name: String,
    /// Whether to emit a `debug!` event for every wrapper phase
    pub trace_phases: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            name: "decorating".to_string(),
            trace_phases: false,
        }
    }
}

impl ExecutorConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable per-phase tracing.
    pub fn with_trace_phases(mut self, enabled: bool) -> Self {
        self.trace_phases = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ExecutorConfig::new()
            .with_name("io-pool")
            .with_trace_phases(true);

        assert_eq!(config.name, "io-pool");
        assert!(config.trace_phases);
    }

    #[test]
    fn test_config_missing_fields_default() {
        let config: ExecutorConfig = serde_json::from_str(r#"{"trace_phases": true}"#).unwrap();
        assert_eq!(config.name, "decorating");
        assert!(config.trace_phases);

        let config: ExecutorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExecutorConfig::default());
    }
}
