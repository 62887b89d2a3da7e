//! Prometheus-compatible metrics for the granary service.
//!
//! Counters and histograms are incremented next to the event they count:
//! classification metrics in the classifier, ingestion, validation and
//! filter metrics in the service layer.

use prometheus::{self, Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get or initialize the global metrics instance.
pub fn get_metrics() -> Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new())).clone()
}

/// Default histogram buckets for latency tracking (in seconds).
/// Covers from 1ms to 30s; the upper end accommodates slow model calls.
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ]
}

/// All metrics for the granary server.
pub struct Metrics {
    /// Prometheus registry for all metrics.
    pub registry: Registry,

    // =========================================================================
    // Counters
    // =========================================================================
    /// Total number of grants ingested and stored.
    pub grants_ingested_total: IntCounter,
    /// Total number of grant payloads rejected by validation.
    pub validation_failures_total: IntCounter,
    /// Total number of classifications answered by the remote model.
    pub classifications_model_total: IntCounter,
    /// Total number of classifications answered by the heuristic fallback.
    pub classifications_heuristic_total: IntCounter,
    /// Total number of failed remote model calls.
    pub remote_failures_total: IntCounter,
    /// Total number of filter queries served.
    pub filter_queries_total: IntCounter,

    // =========================================================================
    // Gauges
    // =========================================================================
    /// Current number of stored grants.
    pub grants_count: IntGauge,
    /// Number of canonical tags in the loaded taxonomy.
    pub taxonomy_tags: IntGauge,
    /// Uptime in seconds.
    pub uptime_seconds: IntGauge,

    // =========================================================================
    // Histograms (durations in seconds)
    // =========================================================================
    /// End-to-end classification duration per grant in seconds.
    pub classify_duration_seconds: Histogram,
    /// Remote model call duration in seconds.
    pub remote_call_duration_seconds: Histogram,

    /// Server start time.
    start_time: RwLock<Instant>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered.
    pub fn new() -> Self {
        let registry = Registry::new();

        // Counters
        let grants_ingested_total = IntCounter::new(
            "granary_grants_ingested_total",
            "Total number of grants ingested and stored",
        )
        .expect("failed to create counter");

        let validation_failures_total = IntCounter::new(
            "granary_validation_failures_total",
            "Total number of grant payloads rejected by validation",
        )
        .expect("failed to create counter");

        let classifications_model_total = IntCounter::new(
            "granary_classifications_model_total",
            "Total number of classifications answered by the remote model",
        )
        .expect("failed to create counter");

        let classifications_heuristic_total = IntCounter::new(
            "granary_classifications_heuristic_total",
            "Total number of classifications answered by the heuristic fallback",
        )
        .expect("failed to create counter");

        let remote_failures_total = IntCounter::new(
            "granary_remote_failures_total",
            "Total number of failed remote model calls",
        )
        .expect("failed to create counter");

        let filter_queries_total = IntCounter::new(
            "granary_filter_queries_total",
            "Total number of filter queries served",
        )
        .expect("failed to create counter");

        // Gauges
        let grants_count =
            IntGauge::new("granary_grants_count", "Current number of stored grants")
                .expect("failed to create gauge");

        let taxonomy_tags = IntGauge::new(
            "granary_taxonomy_tags",
            "Number of canonical tags in the loaded taxonomy",
        )
        .expect("failed to create gauge");

        let uptime_seconds = IntGauge::new("granary_uptime_seconds", "Server uptime in seconds")
            .expect("failed to create gauge");

        // Histograms with latency buckets (in seconds)
        let classify_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "granary_classify_duration_seconds",
                "End-to-end classification duration per grant in seconds",
            )
            .buckets(default_latency_buckets()),
        )
        .expect("failed to create histogram");

        let remote_call_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "granary_remote_call_duration_seconds",
                "Remote model call duration in seconds",
            )
            .buckets(default_latency_buckets()),
        )
        .expect("failed to create histogram");

        // Register all metrics
        registry
            .register(Box::new(grants_ingested_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(validation_failures_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(classifications_model_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(classifications_heuristic_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(remote_failures_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(filter_queries_total.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(grants_count.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(taxonomy_tags.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(uptime_seconds.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(classify_duration_seconds.clone()))
            .expect("failed to register metric");
        registry
            .register(Box::new(remote_call_duration_seconds.clone()))
            .expect("failed to register metric");

        Self {
            registry,
            // Counters
            grants_ingested_total,
            validation_failures_total,
            classifications_model_total,
            classifications_heuristic_total,
            remote_failures_total,
            filter_queries_total,
            // Gauges
            grants_count,
            taxonomy_tags,
            uptime_seconds,
            // Histograms
            classify_duration_seconds,
            remote_call_duration_seconds,
            // Internal state
            start_time: RwLock::new(Instant::now()),
        }
    }

    /// Update the uptime gauge.
    pub fn update_uptime(&self) {
        let uptime = self.start_time.read().elapsed();
        self.uptime_seconds.set(uptime.as_secs() as i64);
    }

    /// Export metrics in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;
        self.update_uptime();

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    /// Start a timer that records duration to a histogram when dropped.
    /// Returns a guard that will observe the duration in seconds.
    pub fn start_timer(histogram: &Histogram) -> HistogramTimer {
        HistogramTimer {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

/// Timer that records duration to a histogram when dropped.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.histogram.observe(duration.as_secs_f64());
    }
}

impl HistogramTimer {
    /// Get the elapsed time without stopping the timer.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
