use chrono::{DateTime, Utc};
use serde::Serialize;

const BASE_STEPS: [&str; 8] = [
    "load_data",
    "compute_kpis",
    "compute_trends",
    "detect_roas_changes",
    "generate_hypotheses",
    "validate_hypotheses",
    "generate_creative_recommendations",
    "compile_report",
];

/// Ordered analysis steps derived from the user's query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub steps: Vec<String>,
    pub notes: Vec<String>,
}

pub fn plan(query: &str) -> Plan {
    plan_at(query, Utc::now())
}

/// Keyword-driven planning; everything but `timestamp` depends only on `query`.
pub fn plan_at(query: &str, timestamp: DateTime<Utc>) -> Plan {
    let q = query.trim().to_lowercase();
    let mut steps: Vec<String> = BASE_STEPS.iter().map(|s| s.to_string()).collect();
    let mut notes = Vec::new();

    if q.contains("roas") && ["drop", "decrease", "fall"].iter().any(|k| q.contains(k)) {
        notes.push("Focus on recent ROAS drop: compare lookback windows (recent vs previous).".to_string());
        move_step(&mut steps, "detect_roas_changes", 2);
        move_step(&mut steps, "validate_hypotheses", 4);
    }

    if q.contains("creative") || q.contains("ctr") {
        notes.push("Include creative-message analysis and CTR-based recommendations.".to_string());
        ensure_step(&mut steps, "generate_creative_recommendations", None);
    }

    if q.contains("audience") || q.contains("fatigue") {
        notes.push("Check audience sizes, impressions and frequency for signs of fatigue.".to_string());
        ensure_step(&mut steps, "check_audience_signals", Some(3));
    }

    Plan {
        query: query.to_string(),
        timestamp,
        steps,
        notes,
    }
}

fn move_step(steps: &mut Vec<String>, step: &str, index: usize) {
    if let Some(pos) = steps.iter().position(|s| s == step) {
        let s = steps.remove(pos);
        steps.insert(index.min(steps.len()), s);
    }
}

/// Insert `step` at `index` (or append) unless it is already planned.
fn ensure_step(steps: &mut Vec<String>, step: &str, index: Option<usize>) {
    if steps.iter().any(|s| s == step) {
        return;
    }
    match index {
        Some(i) => steps.insert(i.min(steps.len()), step.to_string()),
        None => steps.push(step.to_string()),
    }
}
