use chrono::{NaiveDateTime, TimeDelta};

use crate::types::{Record, WindowSummary};

/// A borrowed subset of the dataset falling inside one date range.
#[derive(Debug, Clone, Default)]
pub struct Window<'a> {
    /// Inclusive lower bound.
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper bound; `None` means "through the last record".
    pub end: Option<NaiveDateTime>,
    pub records: Vec<&'a Record>,
}

impl Window<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Recent and previous windows of equal length, anchored at the latest date.
#[derive(Debug, Clone, Default)]
pub struct WindowSplit<'a> {
    pub recent: Window<'a>,
    pub previous: Window<'a>,
    pub max_date: Option<NaiveDateTime>,
    pub lookback_days: i64,
    pub dropped_undated: usize,
}

impl WindowSplit<'_> {
    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            max_date: self.max_date,
            lookback_days: self.lookback_days,
            recent_rows: self.recent.len(),
            previous_rows: self.previous.len(),
            dropped_undated: self.dropped_undated,
        }
    }
}

/// Split records into `[max - L, ∞)` and `[max - 2L, max - L)`.
///
/// Undated records are left out of both windows and counted. An input with no
/// dated records yields two empty windows.
pub fn split_windows(records: &[Record], lookback_days: i64) -> WindowSplit<'_> {
    let dated: Vec<(&Record, NaiveDateTime)> = records
        .iter()
        .filter_map(|r| r.date.map(|d| (r, d)))
        .collect();
    let dropped_undated = records.len() - dated.len();

    let Some(max_date) = dated.iter().map(|(_, d)| *d).max() else {
        return WindowSplit {
            lookback_days,
            dropped_undated,
            ..Default::default()
        };
    };

    // A bound that does not fit in the calendar is unbounded.
    let recent_start = days_before(max_date, lookback_days);
    let previous_start = days_before(max_date, lookback_days.saturating_mul(2));

    let mut recent = Window {
        start: recent_start,
        end: None,
        records: Vec::new(),
    };
    let mut previous = Window {
        start: previous_start,
        end: recent_start,
        records: Vec::new(),
    };

    for (record, date) in dated {
        match recent_start {
            Some(start) if date < start => {
                if previous_start.map_or(true, |p| date >= p) {
                    previous.records.push(record);
                }
            }
            _ => recent.records.push(record),
        }
    }

    WindowSplit {
        recent,
        previous,
        max_date: Some(max_date),
        lookback_days,
        dropped_undated,
    }
}

fn days_before(date: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_days(days).and_then(|d| date.checked_sub_signed(d))
}
