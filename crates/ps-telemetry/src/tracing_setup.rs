//! `tracing-subscriber` setup.
//!
//! Pretty output for development, JSON for containers. The filter comes
//! from `RUST_LOG` when set, otherwise from the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Marker that the global subscriber was installed.
pub struct TracingGuard {
    service_name: String,
}

impl TracingGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "Tracing guard dropped");
    }
}

fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
pub fn init_tracing(config: &TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    let env_filter = env_filter(config)?;

    let result = match (config.console_output, config.json_logs) {
        (true, true) => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()
        }
        (true, false) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
        (false, _) => tracing_subscriber::registry().with(env_filter).try_init(),
    };
    result.map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Tracing initialized"
    );

    Ok(TracingGuard {
        service_name: config.service_name.clone(),
    })
}
