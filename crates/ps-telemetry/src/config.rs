//! Telemetry configuration from environment variables.

use std::env;

/// Logging and metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a directive list)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "proximity-signal".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PS_SERVICE_NAME`: Service name (default: proximity-signal)
    /// - `PS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `PS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `PS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    fn from_lookup<F>(lookup: F, is_container: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: lookup("PS_SERVICE_NAME")
                .unwrap_or_else(|| "proximity-signal".to_string()),

            log_level: lookup("PS_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("PS_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("PS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Quiet configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            log_level: "warn".to_string(),
            console_output: false,
            ..Self::default()
        }
    }
}
