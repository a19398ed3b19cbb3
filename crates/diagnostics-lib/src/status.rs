//! Task status snapshots
//!
//! Projects the scheduler's counters and per-worker tables into a
//! `StatusSnapshot`, and from there into `TaskCounters`.

use crate::error::{DiagnosticsError, Result};
use crate::family::KeyFamily;
use crate::models::{SchedulerState, StatusSnapshot, TaskCounters, WorkerAddress};
use crate::observability::DiagnosticsMetrics;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds status snapshots from scheduler state
pub struct StatusSnapshotBuilder<F> {
    family: F,
    metrics: DiagnosticsMetrics,
}

impl<F: KeyFamily> StatusSnapshotBuilder<F> {
    pub fn new(family: F) -> Self {
        Self {
            family,
            metrics: DiagnosticsMetrics::new(),
        }
    }

    /// Task counters for the given state
    pub fn build(&self, state: &SchedulerState) -> Result<TaskCounters> {
        TaskCounters::from_snapshot(&self.snapshot(state)?)
    }

    /// Full status snapshot for the given state
    ///
    /// Fails if a worker address is malformed, a known worker has no
    /// `has_what` entry, or a held key has no recorded size.
    pub fn snapshot(&self, state: &SchedulerState) -> Result<StatusSnapshot> {
        let mut bytes = BTreeMap::new();
        for worker in state.ncores.keys() {
            WorkerAddress::parse(worker)?;
            bytes.insert(worker.clone(), self.bytes_stored(state, worker)?);
        }

        let mut processing = BTreeMap::new();
        for (worker, keys) in &state.processing {
            WorkerAddress::parse(worker)?;
            processing.insert(worker.clone(), count_families(&self.family, keys.iter()));
        }

        let snapshot = StatusSnapshot {
            address: state.address.clone(),
            ncores: state.ncores.clone(),
            bytes,
            processing,
            tasks: state.total_tasks,
            in_memory: state.who_has.len() as u64,
            ready: (state.ready.len() + state.stacks.values().map(Vec::len).sum::<usize>())
                as u64,
            waiting: state.waiting.len() as u64,
            failed: state.exceptions_blame.len() as u64,
        };

        self.metrics.inc_status_builds();
        debug!(
            event = "status_built",
            scheduler = %snapshot.address,
            workers = snapshot.ncores.len(),
            tasks = snapshot.tasks,
            "Built scheduler status snapshot"
        );

        Ok(snapshot)
    }

    fn bytes_stored(&self, state: &SchedulerState, worker: &str) -> Result<u64> {
        let keys = state
            .has_what
            .get(worker)
            .ok_or_else(|| DiagnosticsError::MissingWorkerField {
                worker: worker.to_string(),
                field: "has_what",
            })?;

        keys.iter().try_fold(0u64, |total, key| {
            let size = state
                .nbytes
                .get(key)
                .ok_or_else(|| DiagnosticsError::UnknownKeySize {
                    worker: worker.to_string(),
                    key: key.clone(),
                })?;
            total
                .checked_add(*size)
                .ok_or(DiagnosticsError::CounterOverflow { field: "bytes" })
        })
    }
}

/// Count keys per family using the given extractor
pub(crate) fn count_families<'a, F: KeyFamily>(
    family: &F,
    keys: impl Iterator<Item = &'a String>,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(family.family(key)).or_insert(0) += 1;
    }
    counts
}
