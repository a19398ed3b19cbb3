//! Task progress table
//!
//! Six fixed rows, one per counter, each with a bar proportional to the
//! total task count.

use crate::config::ReportConfig;
use crate::models::TaskCounters;
use crate::observability::{anomalies, DiagnosticsMetrics};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tracing::warn;

/// Number of marker units drawn for `count` out of `total`
///
/// Zero when `total` is zero. A count above the total yields a bar longer
/// than `width`; it is left that way so the anomaly stays visible.
pub fn bar_length(count: u64, total: u64, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (width as u128 * count as u128 / total as u128) as usize
}

/// Bar of `length` markers, left-aligned and padded to `width`
pub fn render_bar(length: usize, width: usize, marker: char) -> String {
    format!("{:<width$}", marker.to_string().repeat(length), width = width)
}

/// Row of the progress table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct ProgressRow {
    #[tabled(rename = "Tasks")]
    pub state: String,
    #[tabled(rename = "Count")]
    pub count: u64,
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[tabled(skip)]
    pub bar_length: usize,
}

/// Rendered task progress table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTable {
    pub rows: Vec<ProgressRow>,
}

impl ProgressTable {
    /// Render counters with the default bar settings
    pub fn render(counters: &TaskCounters) -> Self {
        Self::render_with(counters, &ReportConfig::default())
    }

    /// Render counters; every bar uses `counters.total` as denominator
    pub fn render_with(counters: &TaskCounters, config: &ReportConfig) -> Self {
        let rows = counters
            .rows()
            .into_iter()
            .map(|(state, count)| {
                let length = bar_length(count, counters.total, config.bar_width);
                if length > config.bar_width {
                    DiagnosticsMetrics::new().inc_anomaly(anomalies::COUNT_EXCEEDS_TOTAL);
                    warn!(
                        event = "count_exceeds_total",
                        state = state,
                        count = count,
                        total = counters.total,
                        "Task count exceeds reported total"
                    );
                }

                ProgressRow {
                    state: state.to_string(),
                    count,
                    progress: render_bar(length, config.bar_width, config.bar_marker),
                    bar_length: length,
                }
            })
            .collect();

        Self { rows }
    }

    pub fn row(&self, state: &str) -> Option<&ProgressRow> {
        self.rows.iter().find(|row| row.state == state)
    }
}

impl fmt::Display for ProgressTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = Table::new(&self.rows)
            .with(Style::blank())
            .with(Modify::new(Columns::single(1)).with(Alignment::right()))
            .to_string();
        f.write_str(&table)
    }
}
