//! Core data models for scheduler diagnostics
//!
//! `SchedulerState` is the caller-materialized copy of scheduler internals.
//! Everything else is a value object built from it and owned by the call
//! that produced it.

use crate::error::{DiagnosticsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Point-in-time copy of the scheduler state read by the aggregators
///
/// Keys and worker addresses are plain strings. The caller is responsible
/// for taking this copy consistently (under the scheduler's lock or from
/// its own event loop).
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Scheduler's own address
    pub address: String,
    /// Worker address -> number of cores
    pub ncores: BTreeMap<String, u32>,
    /// Task key -> size in bytes of its result
    pub nbytes: HashMap<String, u64>,
    /// Worker address -> keys held in memory on that worker
    pub has_what: HashMap<String, BTreeSet<String>>,
    /// Worker address -> keys currently executing on that worker
    pub processing: HashMap<String, BTreeSet<String>>,
    /// Total number of tasks known to the scheduler
    pub total_tasks: u64,
    /// Task key -> workers holding its result
    pub who_has: HashMap<String, BTreeSet<String>>,
    /// Global ready queue
    pub ready: Vec<String>,
    /// Worker address -> keys stacked for that worker
    pub stacks: HashMap<String, Vec<String>>,
    /// Task key -> dependencies it is still waiting on
    pub waiting: HashMap<String, BTreeSet<String>>,
    /// Failed task key -> key blamed for the exception
    pub exceptions_blame: HashMap<String, String>,
    /// Host -> resource record reported by that host's workers
    pub host_info: BTreeMap<String, HostRecord>,
}

/// Resource record kept by the scheduler for one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostRecord {
    pub cores: u32,
    /// Cpu utilisation in percent
    pub cpu: f64,
    pub total_memory: u64,
    pub available_memory: u64,
    /// Round-trip latency in seconds, once measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    /// Worker ports on this host, in discovery order
    pub ports: Vec<String>,
    /// When the last heartbeat from this host arrived
    pub last_heartbeat: DateTime<Utc>,
    /// Port the last heartbeat came from
    pub heartbeat_port: u16,
}

impl HostRecord {
    /// Reject records whose resource figures cannot be real, or that list
    /// a worker port twice
    pub fn validate(&self, host: &str) -> Result<()> {
        if !(0.0..=100.0).contains(&self.cpu) {
            return Err(DiagnosticsError::CpuOutOfRange {
                host: host.to_string(),
                cpu: self.cpu,
            });
        }
        let mut seen = HashSet::new();
        if let Some(port) = self.ports.iter().find(|port| !seen.insert(port.as_str())) {
            return Err(DiagnosticsError::DuplicatePort {
                host: host.to_string(),
                port: port.clone(),
            });
        }
        if self.available_memory >= self.total_memory {
            return Err(DiagnosticsError::InvalidMemory {
                host: host.to_string(),
                available: self.available_memory,
                total: self.total_memory,
            });
        }
        Ok(())
    }
}

/// Worker address split into host and port
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerAddress {
    host: String,
    port: String,
}

impl WorkerAddress {
    /// Parse `host:port`; the port must be a valid TCP port
    pub fn parse(address: &str) -> Result<Self> {
        let malformed = || DiagnosticsError::MalformedAddress(address.to_string());

        let (host, port) = address.rsplit_once(':').ok_or_else(malformed)?;
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(malformed());
        }

        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
        })
    }

    /// Build the address of a worker from its host and port
    pub fn new(host: &str, port: &str) -> Result<Self> {
        Self::parse(&format!("{}:{}", host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for WorkerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Task and worker status as served to diagnostics consumers
///
/// Unknown keys are ignored when parsing, so richer status payloads can be
/// fed in unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatusSnapshot {
    pub address: String,
    pub ncores: BTreeMap<String, u32>,
    /// Worker address -> bytes held in memory
    pub bytes: BTreeMap<String, u64>,
    /// Worker address -> family -> number of tasks executing
    pub processing: BTreeMap<String, BTreeMap<String, u64>>,
    /// Total number of tasks
    pub tasks: u64,
    pub in_memory: u64,
    pub ready: u64,
    pub waiting: u64,
    pub failed: u64,
}

impl StatusSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Aggregate task progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskCounters {
    pub waiting: u64,
    pub ready: u64,
    pub failed: u64,
    pub in_progress: u64,
    pub in_memory: u64,
    /// Taken as reported; not checked against the other counters
    pub total: u64,
}

impl TaskCounters {
    /// Derive counters from a status snapshot
    ///
    /// Fails if the processing counts do not fit in a `u64` when summed.
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Result<Self> {
        let in_progress = snapshot
            .processing
            .values()
            .flat_map(|families| families.values())
            .try_fold(0u64, |total, count| total.checked_add(*count))
            .ok_or(DiagnosticsError::CounterOverflow {
                field: "in-progress",
            })?;

        Ok(Self {
            waiting: snapshot.waiting,
            ready: snapshot.ready,
            failed: snapshot.failed,
            in_progress,
            in_memory: snapshot.in_memory,
            total: snapshot.tasks,
        })
    }

    /// Labelled counters in display order
    pub fn rows(&self) -> [(&'static str, u64); 6] {
        [
            ("waiting", self.waiting),
            ("ready", self.ready),
            ("failed", self.failed),
            ("in-progress", self.in_progress),
            ("in-memory", self.in_memory),
            ("total", self.total),
        ]
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Per-worker resource and processing breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub address: String,
    pub ncores: u32,
    pub bytes_stored: u64,
    /// Family -> count, only for families with a nonzero count
    pub processing: BTreeMap<String, u64>,
}

impl WorkerRecord {
    /// One record per worker named anywhere in the snapshot
    ///
    /// Every worker must appear in all of `ncores`, `bytes` and
    /// `processing`; zero counts are dropped from `processing`.
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Result<Vec<Self>> {
        let workers: BTreeSet<&String> = snapshot
            .ncores
            .keys()
            .chain(snapshot.bytes.keys())
            .chain(snapshot.processing.keys())
            .collect();

        workers
            .into_iter()
            .map(|worker| -> Result<Self> {
                WorkerAddress::parse(worker)?;
                let missing = |field| DiagnosticsError::MissingWorkerField {
                    worker: worker.clone(),
                    field,
                };

                let ncores = *snapshot.ncores.get(worker).ok_or_else(|| missing("ncores"))?;
                let bytes_stored = *snapshot.bytes.get(worker).ok_or_else(|| missing("bytes"))?;
                let processing = snapshot
                    .processing
                    .get(worker)
                    .ok_or_else(|| missing("processing"))?
                    .iter()
                    .filter(|(_, count)| **count > 0)
                    .map(|(family, count)| (family.clone(), *count))
                    .collect();

                Ok(Self {
                    address: worker.clone(),
                    ncores,
                    bytes_stored,
                    processing,
                })
            })
            .collect()
    }
}

/// Host-level view of the workers sharing one network host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostInfo {
    pub cores: u32,
    pub cpu: f64,
    pub total_memory: u64,
    pub available_memory: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    /// Worker ports in discovery order
    pub ports: Vec<String>,
    /// Family -> tasks executing across all workers on the host
    pub processing: BTreeMap<String, u64>,
    /// Seconds since the last heartbeat; negative under clock skew
    pub last_seen: f64,
}
