//! Rendering configuration

use serde::Deserialize;

/// Width of the progress column in marker units
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Character repeated to draw a progress bar
pub const DEFAULT_BAR_MARKER: char = '+';

/// Configuration for rendered reports
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Bar length drawn for a row whose count equals the total
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Marker character used for bars
    #[serde(default = "default_bar_marker")]
    pub bar_marker: char,
}

fn default_bar_width() -> usize {
    DEFAULT_BAR_WIDTH
}

fn default_bar_marker() -> char {
    DEFAULT_BAR_MARKER
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bar_width: default_bar_width(),
            bar_marker: default_bar_marker(),
        }
    }
}
