//! Windowed aggregation and hypothesis synthesis.

pub mod aggregate;
pub mod hypothesis;
pub mod window;

use tracing::{debug, info, warn};

use crate::types::{InsightResult, Record};

/// Split, aggregate both windows, compute percent changes and emit hypotheses.
pub fn analyze(records: &[Record], lookback_days: i64) -> InsightResult {
    let split = window::split_windows(records, lookback_days);
    debug!(
        max_date = ?split.max_date,
        recent_start = ?split.recent.start,
        previous_start = ?split.previous.start,
        previous_end = ?split.previous.end,
        "Windows resolved"
    );
    if split.dropped_undated > 0 {
        warn!(dropped = split.dropped_undated, "Rows with unparseable dates left out of both windows");
    }
    if split.previous.is_empty() {
        warn!(lookback_days, "Previous window is empty; percent changes will read as 0");
    }

    let recent = aggregate::aggregate(&split.recent);
    let previous = aggregate::aggregate(&split.previous);
    let percent_changes = aggregate::percent_changes(&recent, &previous);
    let hypotheses = hypothesis::generate(&recent, &previous);

    info!(
        recent_rows = split.recent.len(),
        previous_rows = split.previous.len(),
        roas_change_pct = percent_changes.roas,
        ctr_change_pct = percent_changes.ctr,
        "Insight windows aggregated, {} hypotheses generated",
        hypotheses.len(),
    );

    InsightResult {
        recent_window: recent,
        previous_window: previous,
        percent_changes,
        hypotheses,
        windows: split.summary(),
    }
}
