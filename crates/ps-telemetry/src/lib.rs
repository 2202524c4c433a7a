//! # PS Telemetry
//!
//! Logging and metrics for the Proximity Signal engine.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus counters in a crate-local registry, rendered as text
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ps_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PS_SERVICE_NAME` | `proximity-signal` | Service name in logs |
//! | `PS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PS_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, ACTIVE_SESSIONS,
    ARRIVAL_NOTICES, NEARBY_QUERIES, NEARBY_QUERY_DURATION, REVEALS, SIGNAL_ACTIVATIONS,
    SIGNAL_CREATION_DENIALS, SIGNAL_ENDINGS, SUBSCRIPTION_FAILURES,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first; they do not depend on the subscriber.
    let metrics_handle = register_metrics()?;
    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
