use crate::insight::window::Window;
use crate::types::{Metric, MetricSet, PercentChangeSet, Record};

/// Reduce a window to its summary metrics. Missing numeric cells count as 0.
pub fn aggregate(window: &Window<'_>) -> MetricSet {
    aggregate_records(window.records.iter().copied())
}

pub fn aggregate_records<'a, I>(records: I) -> MetricSet
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut m = MetricSet::default();
    for r in records {
        m.spend += r.spend.unwrap_or(0.0);
        m.impressions += r.impressions.unwrap_or(0.0);
        m.clicks += r.clicks.unwrap_or(0.0);
        m.purchases += r.purchases.unwrap_or(0.0);
        m.revenue += r.revenue.unwrap_or(0.0);
    }
    m.ctr = ratio(m.clicks, m.impressions);
    m.cpc = ratio(m.spend, m.clicks);
    m.cpa = ratio(m.spend, m.purchases);
    m.roas = ratio(m.revenue, m.spend);
    m
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// `(new - old) / old * 100`, defined as 0 when `old == 0`.
pub fn percent_change(new: f64, old: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

pub fn percent_changes(recent: &MetricSet, previous: &MetricSet) -> PercentChangeSet {
    let mut changes = PercentChangeSet::default();
    for metric in Metric::ALL {
        changes.set(metric, percent_change(recent.get(metric), previous.get(metric)));
    }
    changes
}
