//! Hypothesis validation against windowed numeric evidence.

pub mod classifier;
pub mod scorer;

use tracing::{debug, info};

use crate::config::{Config, EvaluationMode, Thresholds};
use crate::types::{Hypothesis, InsightResult, MetricSet, PercentChangeSet, ValidatedHypothesis};
use classifier::{Claim, Route};
use scorer::Evidence;

pub struct HypothesisEvaluator<'a> {
    thresholds: &'a Thresholds,
    mode: EvaluationMode,
}

impl<'a> HypothesisEvaluator<'a> {
    pub fn new(cfg: &'a Config) -> Self {
        Self::with_mode(&cfg.thresholds, cfg.evaluation.mode)
    }

    pub fn with_mode(thresholds: &'a Thresholds, mode: EvaluationMode) -> Self {
        Self { thresholds, mode }
    }

    /// Validate every hypothesis of an insight run, preserving order.
    pub fn evaluate(&self, insight: &InsightResult) -> Vec<ValidatedHypothesis> {
        self.evaluate_hypotheses(
            &insight.percent_changes,
            &insight.recent_window,
            &insight.previous_window,
            &insight.hypotheses,
        )
    }

    pub fn evaluate_hypotheses(
        &self,
        changes: &PercentChangeSet,
        recent: &MetricSet,
        previous: &MetricSet,
        hypotheses: &[Hypothesis],
    ) -> Vec<ValidatedHypothesis> {
        let claims = hypotheses.iter().map(|h| {
            let claim = match self.mode {
                EvaluationMode::Tagged => Claim::from_tags(h),
                EvaluationMode::Text => Claim::from_text(&h.text),
            };
            (h.text.as_str(), claim)
        });
        self.score_all(changes, recent, previous, claims)
    }

    /// Validate free-form statements. Family and direction always come from the text.
    pub fn evaluate_statements<S: AsRef<str>>(
        &self,
        changes: &PercentChangeSet,
        recent: &MetricSet,
        previous: &MetricSet,
        statements: &[S],
    ) -> Vec<ValidatedHypothesis> {
        let claims = statements.iter().map(|s| (s.as_ref(), Claim::from_text(s.as_ref())));
        self.score_all(changes, recent, previous, claims)
    }

    fn score_all<'t, I>(
        &self,
        changes: &PercentChangeSet,
        recent: &MetricSet,
        previous: &MetricSet,
        claims: I,
    ) -> Vec<ValidatedHypothesis>
    where
        I: Iterator<Item = (&'t str, Claim)>,
    {
        let ev = Evidence {
            recent,
            previous,
            changes,
            thresholds: self.thresholds,
        };

        let results: Vec<ValidatedHypothesis> = claims
            .map(|(text, claim)| {
                if claim.route == Route::Fallback {
                    debug!(hypothesis = text, "No family keyword matched, scoring on ROAS fallback");
                }
                scorer::score(text, &claim, &ev)
            })
            .collect();

        let validated = results.iter().filter(|v| v.validated).count();
        info!(
            mode = %self.mode,
            validated,
            total = results.len(),
            "Hypotheses evaluated: {validated}/{} validated",
            results.len(),
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::aggregate::percent_changes;
    use crate::insight::hypothesis::generate;

    fn windows() -> (MetricSet, MetricSet) {
        let recent = MetricSet {
            spend: 150.0,
            impressions: 90_000.0,
            clicks: 450.0,
            purchases: 8.0,
            revenue: 300.0,
            ctr: 0.005,
            roas: 2.0,
            ..Default::default()
        };
        let previous = MetricSet {
            spend: 100.0,
            impressions: 100_000.0,
            clicks: 1000.0,
            purchases: 10.0,
            revenue: 400.0,
            ctr: 0.01,
            roas: 4.0,
            ..Default::default()
        };
        (recent, previous)
    }

    #[test]
    fn one_result_per_hypothesis_in_order() {
        let (recent, previous) = windows();
        let changes = percent_changes(&recent, &previous);
        let hyps = generate(&recent, &previous);
        let cfg = Config::default();
        let out = HypothesisEvaluator::new(&cfg).evaluate_hypotheses(&changes, &recent, &previous, &hyps);
        assert_eq!(out.len(), 5);
        for (h, v) in hyps.iter().zip(&out) {
            assert_eq!(h.text, v.hypothesis);
            assert!((0.0..=1.0).contains(&v.confidence));
        }
        // ROAS dropped 50%: 0.9, validated
        assert!((out[0].confidence - 0.9).abs() < 1e-9);
        assert!(out[0].validated);
        // CTR fell 50% with recent CTR 0.5% < 1%: capped at 1.0
        assert!((out[1].confidence - 1.0).abs() < 1e-9);
        assert!(out[1].validated);
    }

    #[test]
    fn text_mode_reproduces_keyword_routing() {
        let (recent, previous) = windows();
        let changes = percent_changes(&recent, &previous);
        let hyps = generate(&recent, &previous);
        assert!(hyps[2].text.starts_with("Spend increased"));

        let thresholds = Thresholds::default();
        let tagged = HypothesisEvaluator::with_mode(&thresholds, EvaluationMode::Tagged)
            .evaluate_hypotheses(&changes, &recent, &previous, &hyps);
        let text = HypothesisEvaluator::with_mode(&thresholds, EvaluationMode::Text)
            .evaluate_hypotheses(&changes, &recent, &previous, &hyps);

        assert!(tagged[2].evidence.starts_with("spend changed by 50.00%"));
        assert!(text[2].evidence.starts_with("CTR changed by -50.00%"));
        // the other four agree
        for i in [0, 1, 3, 4] {
            assert_eq!(tagged[i], text[i]);
        }
    }

    #[test]
    fn unmatched_statement_resolves_via_fallback() {
        let (recent, previous) = windows();
        let changes = percent_changes(&recent, &previous);
        let thresholds = Thresholds::default();
        let out = HypothesisEvaluator::with_mode(&thresholds, EvaluationMode::Tagged).evaluate_statements(
            &changes,
            &recent,
            &previous,
            &["Seasonality shifted demand."],
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].evidence.starts_with("roas changed by -50.00%"));
        assert!((out[0].confidence - 0.5).abs() < 1e-9);
        assert!(out[0].validated);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let (recent, previous) = windows();
        let changes = percent_changes(&recent, &previous);
        let hyps = generate(&recent, &previous);
        let cfg = Config::default();
        let ev = HypothesisEvaluator::new(&cfg);
        assert_eq!(
            ev.evaluate_hypotheses(&changes, &recent, &previous, &hyps),
            ev.evaluate_hypotheses(&changes, &recent, &previous, &hyps)
        );
    }
}
