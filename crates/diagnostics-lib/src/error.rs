//! Error types for scheduler diagnostics
//!
//! Every error here is a precondition violation on the snapshot handed in
//! by the caller. Aggregation anomalies (a bar longer than its column, a
//! heartbeat from the future) are reported in the output instead.

use thiserror::Error;

/// Errors raised while projecting a scheduler snapshot
#[derive(Error, Debug)]
pub enum DiagnosticsError {
    /// Worker address is not of the form `host:port`
    #[error("malformed worker address '{0}': expected host:port")]
    MalformedAddress(String),

    /// A per-worker table has no entry for a known worker
    #[error("worker {worker} has no '{field}' entry")]
    MissingWorkerField {
        worker: String,
        field: &'static str,
    },

    /// A worker holds a key whose size was never recorded
    #[error("worker {worker} holds key '{key}' with no recorded size")]
    UnknownKeySize { worker: String, key: String },

    /// Host memory figures are inconsistent
    #[error("host {host}: available memory {available} is not below total memory {total}")]
    InvalidMemory {
        host: String,
        available: u64,
        total: u64,
    },

    /// Host cpu percentage is outside [0, 100]
    #[error("host {host}: cpu {cpu} is outside [0, 100]")]
    CpuOutOfRange { host: String, cpu: f64 },

    /// A host record lists the same worker port more than once
    #[error("host {host}: port {port} is listed more than once")]
    DuplicatePort { host: String, port: String },

    /// Summing a counter exceeded the u64 range
    #[error("counter '{field}' overflowed while summing")]
    CounterOverflow { field: &'static str },

    /// Snapshot JSON is malformed, incomplete, or carries negative counts
    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DiagnosticsError>;
