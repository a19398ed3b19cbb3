//! Per-worker status table

use crate::models::WorkerRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

/// Row of the worker table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct WorkerRow {
    #[tabled(rename = "Workers")]
    pub address: String,
    #[tabled(rename = "Ncores")]
    pub ncores: u32,
    #[tabled(rename = "Bytes")]
    pub bytes: u64,
    /// Families with a nonzero count, ascending
    #[tabled(rename = "Processing", display_with = "display_families")]
    pub processing: Vec<String>,
}

fn display_families(families: &[String]) -> String {
    format!("[{}]", families.join(", "))
}

/// Rendered worker table, one row per worker in address order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTable {
    pub rows: Vec<WorkerRow>,
}

impl WorkerTable {
    pub fn render(records: &[WorkerRecord]) -> Self {
        let mut rows: Vec<WorkerRow> = records
            .iter()
            .map(|record| WorkerRow {
                address: record.address.clone(),
                ncores: record.ncores,
                bytes: record.bytes_stored,
                processing: record
                    .processing
                    .iter()
                    .filter(|(_, count)| **count > 0)
                    .map(|(family, _)| family.clone())
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| a.address.cmp(&b.address));

        Self { rows }
    }
}

impl fmt::Display for WorkerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Table::new(&self.rows)
            .with(Style::blank())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        f.write_str(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(address: &str, ncores: u32, bytes: u64, processing: &[(&str, u64)]) -> WorkerRecord {
        WorkerRecord {
            address: address.to_string(),
            ncores,
            bytes_stored: bytes,
            processing: processing
                .iter()
                .map(|(family, count)| (family.to_string(), *count))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_rows_sorted_by_address() {
        let table = WorkerTable::render(&[
            record("192.168.1.107:44544", 4, 1000, &[("inc", 3), ("add", 1)]),
            record("192.168.1.107:36441", 4, 2000, &[("inc", 2)]),
            record("10.0.0.1:9000", 1, 0, &[]),
        ]);

        let addresses: Vec<_> = table.rows.iter().map(|row| row.address.as_str()).collect();
        assert_eq!(
            addresses,
            ["10.0.0.1:9000", "192.168.1.107:36441", "192.168.1.107:44544"]
        );
    }

    #[test]
    fn test_processing_is_sorted_family_names() {
        let table = WorkerTable::render(&[
            record("192.168.1.107:44544", 4, 1000, &[("inc", 3), ("add", 1), ("idle", 0)]),
            record("192.168.1.107:36441", 4, 2000, &[("inc", 2)]),
        ]);

        assert_eq!(table.rows[0].processing, ["inc"]);
        assert_eq!(table.rows[1].processing, ["add", "inc"]);
        assert_eq!(table.rows[1].bytes, 1000);
    }

    #[test]
    fn test_display() {
        let text = WorkerTable::render(&[
            record("192.168.1.107:44544", 4, 1000, &[("inc", 3), ("add", 1)]),
            record("192.168.1.107:36441", 4, 2000, &[("inc", 2)]),
        ])
        .to_string();

        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("Workers"));
        assert!(lines[0].contains("Ncores"));
        assert!(lines[0].contains("Bytes"));
        assert!(lines[0].contains("Processing"));
        assert!(lines[1].contains("192.168.1.107:36441") && lines[1].contains("[inc]"));
        assert!(lines[2].contains("192.168.1.107:44544") && lines[2].contains("[add, inc]"));
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = WorkerTable::render(&[]);
        assert!(table.rows.is_empty());
        assert_eq!(table.to_string().lines().count(), 1);
    }

    #[test]
    fn test_table_json_round_trip() {
        let table = WorkerTable::render(&[
            record("192.168.1.107:44544", 4, 1000, &[("inc", 3), ("add", 1)]),
            record("192.168.1.107:36441", 4, 2000, &[("inc", 2)]),
        ]);
        let json = serde_json::to_string(&table).unwrap();

        let parsed: WorkerTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
        assert_eq!(parsed.to_string(), table.to_string());
    }
}
