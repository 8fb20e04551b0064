//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observability::logging::LogLevel;

/// Root configuration for the todo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request and todo log channels.
    pub logging: LoggingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Process-level tracing and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log channel configuration.
///
/// Levels here are the starting thresholds; clients can change them at
/// runtime through `/logs/level`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding both log files. Created if missing.
    pub directory: String,

    /// File name for the request channel.
    pub request_log_file: String,

    /// File name for the todo channel.
    pub todo_log_file: String,

    /// Initial threshold of the request channel.
    pub request_level: LogLevel,

    /// Initial threshold of the todo channel.
    pub todo_level: LogLevel,

    /// Lowest level written to the request log file.
    pub request_file_level: LogLevel,

    /// Lowest level written to the todo log file.
    pub todo_file_level: LogLevel,

    /// Echo request channel entries to stdout.
    pub console_echo: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            request_log_file: "requests.log".to_string(),
            todo_log_file: "todos.log".to_string(),
            request_level: LogLevel::Info,
            todo_level: LogLevel::Info,
            request_file_level: LogLevel::Info,
            todo_file_level: LogLevel::Debug,
            console_echo: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `tracing` filter directive for process logs, used when `RUST_LOG` is unset.
    pub tracing_filter: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            tracing_filter: "todo_service=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.logging.request_level, LogLevel::Info);
        assert_eq!(config.logging.todo_file_level, LogLevel::Debug);
        assert!(config.logging.console_echo);
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9285"

            [logging]
            todo_level = "DEBUG"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9285");
        assert_eq!(config.logging.todo_level, LogLevel::Debug);
        assert_eq!(config.logging.request_level, LogLevel::Info);
        assert_eq!(config.logging.directory, "logs");
    }
}
