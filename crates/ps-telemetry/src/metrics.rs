//! Prometheus metrics for the proximity engine.
//!
//! All metrics follow the naming convention: `ps_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: activations, denials, queries per tier, arrivals, reveals
//! - **Gauge**: live client sessions
//! - **Histogram**: nearby query duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Crate-local metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SIGNAL LIFECYCLE (Subsystem 2)
    // =========================================================================

    /// Activation attempts by outcome
    pub static ref SIGNAL_ACTIVATIONS: CounterVec = CounterVec::new(
        Opts::new("ps_signal_activations_total", "Signal activation attempts"),
        &["outcome"]  // outcome: created/reactivated/denied/failed
    ).expect("metric creation failed");

    /// Creation denials by enforcing side
    pub static ref SIGNAL_CREATION_DENIALS: CounterVec = CounterVec::new(
        Opts::new("ps_signal_creation_denials_total", "Signal creations refused by a rate limit"),
        &["source"]  // source: client/server
    ).expect("metric creation failed");

    /// Signals that ended, by reason
    pub static ref SIGNAL_ENDINGS: CounterVec = CounterVec::new(
        Opts::new("ps_signal_endings_total", "Signals deactivated or expired"),
        &["reason"]  // reason: deactivated/expired
    ).expect("metric creation failed");

    // =========================================================================
    // PROXIMITY QUERY (Subsystem 3)
    // =========================================================================

    /// Nearby queries by the tier that answered
    pub static ref NEARBY_QUERIES: CounterVec = CounterVec::new(
        Opts::new("ps_nearby_queries_total", "Nearby queries by answering tier"),
        &["tier"]  // tier: skipped/aggregate/raw_fallback/demo/exhausted
    ).expect("metric creation failed");

    /// Nearby query duration
    pub static ref NEARBY_QUERY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ps_nearby_query_duration_seconds",
            "Time spent running the nearby cascade"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // REALTIME (Subsystem 4)
    // =========================================================================

    /// Arrival notices emitted
    pub static ref ARRIVAL_NOTICES: Counter = Counter::new(
        "ps_realtime_arrival_notices_total",
        "New-arrival notices emitted"
    ).expect("metric creation failed");

    /// Sessions whose realtime feed went stale
    pub static ref SUBSCRIPTION_FAILURES: Counter = Counter::new(
        "ps_realtime_subscription_failures_total",
        "Realtime subscriptions that could not be (re)established"
    ).expect("metric creation failed");

    /// Live client sessions
    pub static ref ACTIVE_SESSIONS: Gauge = Gauge::new(
        "ps_sessions_active",
        "Client sessions currently open"
    ).expect("metric creation failed");

    // =========================================================================
    // REVEAL GATE (Subsystem 5)
    // =========================================================================

    /// Reveal attempts by outcome
    pub static ref REVEALS: CounterVec = CounterVec::new(
        Opts::new("ps_reveals_total", "Extended profile reveal attempts"),
        &["outcome"]  // outcome: allowed/cooldown/hidden/error
    ).expect("metric creation failed");
}

/// Handle returned once metrics are registered.
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors in the registry.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the crate registry. Safe to call repeatedly.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SIGNAL_ACTIVATIONS.clone()),
        Box::new(SIGNAL_CREATION_DENIALS.clone()),
        Box::new(SIGNAL_ENDINGS.clone()),
        Box::new(NEARBY_QUERIES.clone()),
        Box::new(NEARBY_QUERY_DURATION.clone()),
        Box::new(ARRIVAL_NOTICES.clone()),
        Box::new(SUBSCRIPTION_FAILURES.clone()),
        Box::new(ACTIVE_SESSIONS.clone()),
        Box::new(REVEALS.clone()),
    ];
    let registered = metrics.len();

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        assert!(register_metrics().is_ok());
        let handle = register_metrics().unwrap();
        assert_eq!(handle.registered(), 9);
    }

    #[test]
    fn test_counter_vec_increment() {
        NEARBY_QUERIES.with_label_values(&["aggregate"]).inc();
        assert!(NEARBY_QUERIES.with_label_values(&["aggregate"]).get() >= 1.0);
    }

    #[test]
    fn test_encode_contains_registered_metrics() {
        register_metrics().unwrap();
        ARRIVAL_NOTICES.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("ps_realtime_arrival_notices_total"));
    }

    #[test]
    fn test_histogram_timer_observes_on_drop() {
        let before = NEARBY_QUERY_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&NEARBY_QUERY_DURATION);
        }
        assert!(NEARBY_QUERY_DURATION.get_sample_count() > before);
    }
}
