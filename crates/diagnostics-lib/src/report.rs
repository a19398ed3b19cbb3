//! Text status report
//!
//! Composes the scheduler address and the two tables into one report with
//! trailing whitespace stripped from every line.

use crate::config::ReportConfig;
use crate::error::Result;
use crate::models::{StatusSnapshot, TaskCounters, WorkerRecord};
use crate::observability::DiagnosticsMetrics;
use crate::progress::ProgressTable;
use crate::worker_table::WorkerTable;
use std::time::Instant;

/// Line separator used in rendered reports
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Compose a report from already rendered tables
pub fn format_status(address: &str, progress: &ProgressTable, workers: &WorkerTable) -> String {
    let text = format!("Scheduler: {}\n\n{}\n\n{}", address, progress, workers);
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Render the full status report for a snapshot
pub fn scheduler_status_str(snapshot: &StatusSnapshot, config: &ReportConfig) -> Result<String> {
    let started = Instant::now();

    let progress = ProgressTable::render_with(&TaskCounters::from_snapshot(snapshot)?, config);
    let workers = WorkerTable::render(&WorkerRecord::from_snapshot(snapshot)?);
    let report = format_status(&snapshot.address, &progress, &workers);

    DiagnosticsMetrics::new().observe_render_latency(started.elapsed().as_secs_f64());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticsError;

    const STATUS: &str = r#"{
        "address": "SCHEDULER_ADDRESS:9999",
        "ready": 5,
        "ncores": {"192.168.1.107:44544": 4, "192.168.1.107:36441": 4},
        "in-memory": 30, "waiting": 20,
        "processing": {"192.168.1.107:44544": {"inc": 3, "add": 1},
                       "192.168.1.107:36441": {"inc": 2}},
        "tasks": 70,
        "failed": 9,
        "bytes": {"192.168.1.107:44544": 1000, "192.168.1.107:36441": 2000}
    }"#;

    fn report() -> String {
        let snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        scheduler_status_str(&snapshot, &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_report_layout() {
        let report = report();
        let lines: Vec<_> = report.split(LINE_SEPARATOR).collect();

        assert_eq!(lines[0], "Scheduler: SCHEDULER_ADDRESS:9999");
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("Progress"));
        // header + six counters, then the blank separator line
        assert_eq!(lines[9], "");
        assert!(lines[10].contains("Processing"));
        assert!(lines[11].contains("192.168.1.107:36441"));
        assert!(lines[12].contains("192.168.1.107:44544"));
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn test_no_trailing_whitespace() {
        for line in report().split(LINE_SEPARATOR) {
            assert_eq!(line, line.trim_end(), "line {line:?} has trailing whitespace");
        }
    }

    #[test]
    fn test_bars_in_report() {
        let report = report();
        let waiting = report
            .split(LINE_SEPARATOR)
            .find(|line| line.trim_start().starts_with("waiting"))
            .unwrap();
        assert!(waiting.ends_with(&format!(" {}", "+".repeat(11))));

        let total = report
            .split(LINE_SEPARATOR)
            .find(|line| line.trim_start().starts_with("total"))
            .unwrap();
        assert!(total.ends_with(&"+".repeat(40)));
    }

    #[test]
    fn test_format_status_normalizes_separators() {
        let progress = ProgressTable::render(&TaskCounters {
            waiting: 0,
            ready: 0,
            failed: 0,
            in_progress: 0,
            in_memory: 0,
            total: 0,
        });
        let workers = WorkerTable::render(&[]);

        let report = format_status("tcp://10.0.0.9:8786", &progress, &workers);
        assert!(report.starts_with(&format!("Scheduler: tcp://10.0.0.9:8786{0}{0}", LINE_SEPARATOR)));
        assert!(!report.ends_with(LINE_SEPARATOR));
    }

    #[test]
    fn test_overflowing_snapshot_is_rejected() {
        let mut snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        snapshot
            .processing
            .get_mut("192.168.1.107:36441")
            .unwrap()
            .insert("add".to_string(), u64::MAX);

        let err = scheduler_status_str(&snapshot, &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, DiagnosticsError::CounterOverflow { .. }));
    }

    #[test]
    fn test_inconsistent_snapshot_is_rejected() {
        let mut snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        snapshot.ncores.insert("10.0.0.5:1234".to_string(), 2);

        let err = scheduler_status_str(&snapshot, &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, DiagnosticsError::MissingWorkerField { .. }));
    }
}
