//! Diagnostics library for a distributed task scheduler
//!
//! This crate projects an immutable snapshot of scheduler state into:
//! - Aggregate task progress counters
//! - Per-host worker resource and processing views
//! - Rendered progress and worker tables, and a combined text report
//!
//! It never mutates, schedules, or persists anything.

pub mod config;
pub mod error;
pub mod family;
pub mod models;
pub mod observability;
pub mod progress;
pub mod report;
pub mod status;
pub mod worker_table;
pub mod workers;

pub use config::ReportConfig;
pub use error::{DiagnosticsError, Result};
pub use family::KeyFamily;
pub use models::*;
pub use observability::DiagnosticsMetrics;
pub use progress::{ProgressRow, ProgressTable};
pub use report::{format_status, scheduler_status_str};
pub use status::StatusSnapshotBuilder;
pub use worker_table::{WorkerRow, WorkerTable};
pub use workers::{hosts_to_json, WorkerInfoAggregator};
