//! Observability for the diagnostics layer
//!
//! Prometheus metrics describing how often snapshots are projected and how
//! many anomalies were surfaced. Logging goes through `tracing` at the call
//! sites; no subscriber is installed here.

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for render latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05,
];

/// Anomaly kinds used as the `kind` label
pub mod anomalies {
    pub const NEGATIVE_LAST_SEEN: &str = "negative_last_seen";
    pub const COUNT_EXCEEDS_TOTAL: &str = "count_exceeds_total";
}

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DiagnosticsMetricsInner> = OnceLock::new();

struct DiagnosticsMetricsInner {
    status_builds: IntCounter,
    worker_aggregations: IntCounter,
    hosts_reported: IntGauge,
    anomalies: IntCounterVec,
    render_latency_seconds: Histogram,
}

impl DiagnosticsMetricsInner {
    fn new() -> Self {
        Self {
            status_builds: register_int_counter!(
                "scheduler_diagnostics_status_builds_total",
                "Status snapshots built from scheduler state"
            )
            .expect("Failed to register status_builds_total"),

            worker_aggregations: register_int_counter!(
                "scheduler_diagnostics_worker_aggregations_total",
                "Host-level worker aggregations performed"
            )
            .expect("Failed to register worker_aggregations_total"),

            hosts_reported: register_int_gauge!(
                "scheduler_diagnostics_hosts_reported",
                "Hosts emitted by the most recent worker aggregation"
            )
            .expect("Failed to register hosts_reported"),

            anomalies: register_int_counter_vec!(
                "scheduler_diagnostics_anomalies_total",
                "Aggregation anomalies surfaced in diagnostics output",
                &["kind"]
            )
            .expect("Failed to register anomalies_total"),

            render_latency_seconds: register_histogram!(
                "scheduler_diagnostics_render_latency_seconds",
                "Time spent rendering the text status report",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register render_latency_seconds"),
        }
    }
}

/// Handle to the process-wide diagnostics metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct DiagnosticsMetrics {
    _private: (),
}

impl Default for DiagnosticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticsMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsMetrics").finish_non_exhaustive()
    }
}

impl DiagnosticsMetrics {
    /// Create a handle, registering the metrics on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DiagnosticsMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DiagnosticsMetricsInner {
        GLOBAL_METRICS.get_or_init(DiagnosticsMetricsInner::new)
    }

    pub fn inc_status_builds(&self) {
        self.inner().status_builds.inc();
    }

    /// Record a worker aggregation and the number of hosts it produced
    pub fn record_worker_aggregation(&self, hosts: usize) {
        self.inner().worker_aggregations.inc();
        self.inner().hosts_reported.set(hosts as i64);
    }

    pub fn inc_anomaly(&self, kind: &str) {
        self.inner().anomalies.with_label_values(&[kind]).inc();
    }

    pub fn observe_render_latency(&self, duration_secs: f64) {
        self.inner().render_latency_seconds.observe(duration_secs);
    }

    pub fn status_builds(&self) -> u64 {
        self.inner().status_builds.get()
    }

    pub fn anomaly_count(&self, kind: &str) -> u64 {
        self.inner().anomalies.with_label_values(&[kind]).get()
    }
}
