use crate::config::heuristics::*;
use crate::config::Thresholds;
use crate::evaluator::classifier::{Claim, Route};
use crate::types::{Family, Metric, MetricSet, PercentChangeSet, ValidatedHypothesis};

/// Numeric evidence shared by every hypothesis in one evaluation pass.
pub struct Evidence<'a> {
    pub recent: &'a MetricSet,
    pub previous: &'a MetricSet,
    pub changes: &'a PercentChangeSet,
    pub thresholds: &'a Thresholds,
}

impl Evidence<'_> {
    /// Percent change for `metric`; non-finite values read as 0.
    fn change(&self, metric: Metric) -> f64 {
        let v = self.changes.get(metric);
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

/// `min(1, |change| / threshold)`; a non-positive threshold scales by 100 instead.
pub fn magnitude_score(change_pct: f64, threshold_pct: f64) -> f64 {
    if threshold_pct <= 0.0 {
        return (change_pct.abs() / 100.0).min(1.0);
    }
    (change_pct.abs() / threshold_pct).min(1.0)
}

fn direction_matches(expects_decline: bool, change_pct: f64) -> bool {
    if expects_decline {
        change_pct < 0.0
    } else {
        change_pct >= 0.0
    }
}

fn direction_weight(matched: bool) -> f64 {
    if matched {
        DIRECTION_MATCH_WEIGHT
    } else {
        DIRECTION_MISMATCH_WEIGHT
    }
}

pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// "<metric> changed by X% (recent: R, previous: P)". CTR values use 4 decimals.
pub fn build_evidence(metric: Metric, recent: &MetricSet, previous: &MetricSet, change_pct: f64) -> String {
    let r = recent.get(metric);
    let p = previous.get(metric);
    match metric {
        Metric::Ctr => format!("CTR changed by {change_pct:.2}% (recent: {r:.4}, previous: {p:.4})"),
        _ => format!("{metric} changed by {change_pct:.2}% (recent: {r}, previous: {p})"),
    }
}

/// Score one claim against the evidence. `text` is carried through untouched.
pub fn score(text: &str, claim: &Claim, ev: &Evidence<'_>) -> ValidatedHypothesis {
    let t = ev.thresholds;

    let (metric, confidence, validated) = match claim.route {
        Route::Family(Family::Roas) => {
            let change = ev.change(Metric::Roas);
            let matched = direction_matches(claim.expects_decline, change);
            let conf = magnitude_score(change, t.roas_threshold_pct()) * direction_weight(matched);
            (Metric::Roas, conf, conf > ROAS_CUTOFF && matched)
        }
        Route::Family(Family::Ctr) => {
            let change = ev.change(Metric::Ctr);
            let matched = direction_matches(claim.expects_decline, change);
            let mut conf = magnitude_score(change, t.ctr_threshold_pct()) * direction_weight(matched);
            let recent_ctr_pct = ev.recent.ctr * 100.0;
            if recent_ctr_pct > 0.0 && recent_ctr_pct < t.ctr_low_threshold_pct() {
                conf = (conf + LOW_CTR_BONUS).min(1.0);
            }
            (Metric::Ctr, conf, conf > CTR_CUTOFF && matched)
        }
        Route::Family(Family::Spend) => {
            // no dedicated spend threshold; the ROAS one stands in
            let change = ev.change(Metric::Spend);
            let conf = magnitude_score(change, t.roas_threshold_pct()) * SPEND_WEIGHT;
            (Metric::Spend, conf, conf > SPEND_CUTOFF)
        }
        Route::Family(Family::Impressions) => {
            let change = ev.change(Metric::Impressions);
            let conf = magnitude_score(change, IMPRESSIONS_THRESHOLD_PCT) * IMPRESSIONS_WEIGHT;
            (Metric::Impressions, conf, change.abs() > IMPRESSIONS_MIN_ABS_CHANGE_PCT)
        }
        Route::Family(Family::Purchases) => {
            let change = ev.change(Metric::Purchases);
            let score = magnitude_score(change, PURCHASES_THRESHOLD_PCT);
            let direction_ok = !claim.expects_decline || change < 0.0;
            (Metric::Purchases, score * PURCHASES_WEIGHT, score > PURCHASES_SCORE_CUTOFF && direction_ok)
        }
        Route::Fallback => {
            let change = ev.change(Metric::Roas);
            let score = magnitude_score(change, t.roas_threshold_pct());
            (Metric::Roas, score * FALLBACK_WEIGHT, score > FALLBACK_SCORE_CUTOFF)
        }
    };

    ValidatedHypothesis {
        hypothesis: text.to_string(),
        evidence: build_evidence(metric, ev.recent, ev.previous, ev.change(metric)),
        confidence: round3(confidence.clamp(0.0, 1.0)),
        validated,
    }
}
