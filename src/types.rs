use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dataset rows
// ---------------------------------------------------------------------------

/// One row of the ads dataset. Numeric cells that were empty or failed to
/// parse are `None`; aggregation treats them as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// `None` when the date cell could not be parsed.
    pub date: Option<NaiveDateTime>,
    pub campaign_name: String,
    pub adset_name: String,
    pub creative_message: String,
    pub spend: Option<f64>,
    pub impressions: Option<f64>,
    pub clicks: Option<f64>,
    pub purchases: Option<f64>,
    pub revenue: Option<f64>,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Spend,
    Impressions,
    Clicks,
    Purchases,
    Revenue,
    Ctr,
    Cpc,
    Cpa,
    Roas,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Spend,
        Metric::Impressions,
        Metric::Clicks,
        Metric::Purchases,
        Metric::Revenue,
        Metric::Ctr,
        Metric::Cpc,
        Metric::Cpa,
        Metric::Roas,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Spend => "spend",
            Metric::Impressions => "impressions",
            Metric::Clicks => "clicks",
            Metric::Purchases => "purchases",
            Metric::Revenue => "revenue",
            Metric::Ctr => "ctr",
            Metric::Cpc => "cpc",
            Metric::Cpa => "cpa",
            Metric::Roas => "roas",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Summary metrics for one window. Ratios are 0 when their denominator is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub purchases: f64,
    pub revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

impl MetricSet {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Spend => self.spend,
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Purchases => self.purchases,
            Metric::Revenue => self.revenue,
            Metric::Ctr => self.ctr,
            Metric::Cpc => self.cpc,
            Metric::Cpa => self.cpa,
            Metric::Roas => self.roas,
        }
    }
}

/// Percent change per metric, recent vs previous. A zero previous value
/// yields 0 here, which is indistinguishable from "no change"; read the raw
/// previous value from the matching `MetricSet` when that matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentChangeSet {
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub purchases: f64,
    pub revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

impl PercentChangeSet {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Spend => self.spend,
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Purchases => self.purchases,
            Metric::Revenue => self.revenue,
            Metric::Ctr => self.ctr,
            Metric::Cpc => self.cpc,
            Metric::Cpa => self.cpa,
            Metric::Roas => self.roas,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Spend => &mut self.spend,
            Metric::Impressions => &mut self.impressions,
            Metric::Clicks => &mut self.clicks,
            Metric::Purchases => &mut self.purchases,
            Metric::Revenue => &mut self.revenue,
            Metric::Ctr => &mut self.ctr,
            Metric::Cpc => &mut self.cpc,
            Metric::Cpa => &mut self.cpa,
            Metric::Roas => &mut self.roas,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// Hypotheses
// ---------------------------------------------------------------------------

/// Metric family a hypothesis speaks about. Declaration order is the fixed
/// generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Roas,
    Ctr,
    Spend,
    Impressions,
    Purchases,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Roas,
        Family::Ctr,
        Family::Spend,
        Family::Impressions,
        Family::Purchases,
    ];

    /// Metric whose percent change is the evidence for this family.
    pub fn metric(self) -> Metric {
        match self {
            Family::Roas => Metric::Roas,
            Family::Ctr => Metric::Ctr,
            Family::Spend => Metric::Spend,
            Family::Impressions => Metric::Impressions,
            Family::Purchases => Metric::Purchases,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Recent value is below the previous one.
    Decline,
    /// Recent value is at or above the previous one.
    Improve,
}

/// A catalogue statement plus the family/direction it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub text: String,
    pub family: Family,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedHypothesis {
    pub hypothesis: String,
    pub evidence: String,
    /// Rounded to 3 decimals, always within [0, 1].
    pub confidence: f64,
    pub validated: bool,
}

// ---------------------------------------------------------------------------
// Insight output
// ---------------------------------------------------------------------------

/// Where the two windows landed in the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub max_date: Option<NaiveDateTime>,
    pub lookback_days: i64,
    pub recent_rows: usize,
    pub previous_rows: usize,
    /// Rows left out of both windows because their date did not parse.
    pub dropped_undated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    pub recent_window: MetricSet,
    pub previous_window: MetricSet,
    pub percent_changes: PercentChangeSet,
    pub hypotheses: Vec<Hypothesis>,
    pub windows: WindowSummary,
}

// ---------------------------------------------------------------------------
// Creatives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeBundle {
    pub campaign_name: String,
    pub current_message: String,
    pub ctr: Option<f64>,
    /// Insertion order, deduplicated, at most `max_ideas` long.
    pub ideas: Vec<String>,
    pub rationale: String,
}
