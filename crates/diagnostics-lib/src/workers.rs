//! Host-level worker aggregation
//!
//! Groups workers by the host they run on and folds their processing sets
//! into one family -> count map per host. Ports keep the order of the
//! host record; a host with no ports is not emitted, and a host listing
//! the same port twice is rejected.

use crate::error::{DiagnosticsError, Result};
use crate::family::KeyFamily;
use crate::models::{HostInfo, HostRecord, SchedulerState, WorkerAddress};
use crate::observability::{anomalies, DiagnosticsMetrics};
use crate::status::count_families;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Aggregates per-worker scheduler records into per-host views
pub struct WorkerInfoAggregator<F> {
    family: F,
    metrics: DiagnosticsMetrics,
}

impl<F: KeyFamily> WorkerInfoAggregator<F> {
    pub fn new(family: F) -> Self {
        Self {
            family,
            metrics: DiagnosticsMetrics::new(),
        }
    }

    /// Build the host map as seen at `now`
    pub fn build(
        &self,
        state: &SchedulerState,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, HostInfo>> {
        let mut hosts = BTreeMap::new();

        for (host, record) in &state.host_info {
            if record.ports.is_empty() {
                debug!(event = "host_skipped", host = %host, "Host has no workers");
                continue;
            }
            record.validate(host)?;
            hosts.insert(host.clone(), self.host_info(state, host, record, now)?);
        }

        self.metrics.record_worker_aggregation(hosts.len());
        debug!(
            event = "workers_aggregated",
            hosts = hosts.len(),
            "Aggregated worker information by host"
        );

        Ok(hosts)
    }

    fn host_info(
        &self,
        state: &SchedulerState,
        host: &str,
        record: &HostRecord,
        now: DateTime<Utc>,
    ) -> Result<HostInfo> {
        let mut worker_keys = Vec::with_capacity(record.ports.len());
        for port in &record.ports {
            let worker = WorkerAddress::new(host, port)?.to_string();
            let keys = state
                .processing
                .get(&worker)
                .ok_or_else(|| DiagnosticsError::MissingWorkerField {
                    worker: worker.clone(),
                    field: "processing",
                })?;
            worker_keys.push(keys);
        }
        let processing = count_families(&self.family, worker_keys.into_iter().flatten());

        let last_seen = seconds_between(record.last_heartbeat, now);
        if last_seen < 0.0 {
            self.metrics.inc_anomaly(anomalies::NEGATIVE_LAST_SEEN);
            warn!(
                event = "heartbeat_in_future",
                host = %host,
                last_seen = last_seen,
                "Host heartbeat is ahead of the aggregation clock"
            );
        }

        Ok(HostInfo {
            cores: record.cores,
            cpu: record.cpu,
            total_memory: record.total_memory,
            available_memory: record.available_memory,
            latency: record.latency,
            ports: record.ports.clone(),
            processing,
            last_seen,
        })
    }
}

/// Signed seconds elapsed from `earlier` to `later`
fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let elapsed = later - earlier;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => elapsed.num_seconds() as f64,
    }
}

/// Serialize a host map for a diagnostics endpoint
pub fn hosts_to_json(hosts: &BTreeMap<String, HostInfo>) -> Result<String> {
    Ok(serde_json::to_string(hosts)?)
}
