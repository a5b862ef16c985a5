use crate::types::{Direction, Family, Hypothesis, MetricSet};

/// Catalogue entry: (decline phrasing, improvement phrasing).
fn catalogue(family: Family) -> (&'static str, &'static str) {
    match family {
        Family::Roas => (
            "ROAS dropped — possible cause: spend increased faster than revenue.",
            "ROAS improved — campaigns are becoming more efficient.",
        ),
        Family::Ctr => (
            "CTR fell — creatives may be fatiguing or less relevant.",
            "CTR improved — creative messaging is resonating better.",
        ),
        Family::Spend => (
            "Spend decreased — could limit reach and impressions.",
            "Spend increased — check if this aligns with CTR and purchases.",
        ),
        Family::Impressions => (
            "Impressions dropped — audience size or delivery issues possible.",
            "Impressions increased — reach expanded.",
        ),
        Family::Purchases => (
            "Purchases down — conversion drop or weaker creative performance.",
            "Purchases increased — stronger funnel efficiency.",
        ),
    }
}

/// One statement per family, in `Family::ALL` order. No thresholding:
/// `recent < previous` picks the decline phrasing, anything else the improvement.
pub fn generate(recent: &MetricSet, previous: &MetricSet) -> Vec<Hypothesis> {
    Family::ALL
        .iter()
        .map(|&family| {
            let metric = family.metric();
            let direction = if recent.get(metric) < previous.get(metric) {
                Direction::Decline
            } else {
                Direction::Improve
            };
            statement(family, direction)
        })
        .collect()
}

pub fn statement(family: Family, direction: Direction) -> Hypothesis {
    let (decline, improve) = catalogue(family);
    let text = match direction {
        Direction::Decline => decline,
        Direction::Improve => improve,
    };
    Hypothesis {
        text: text.to_string(),
        family,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_five_in_family_order() {
        let recent = MetricSet { roas: 2.0, ctr: 0.02, spend: 50.0, ..Default::default() };
        let previous = MetricSet { roas: 4.0, ctr: 0.01, spend: 80.0, impressions: 10.0, ..Default::default() };
        let hyps = generate(&recent, &previous);
        let families: Vec<Family> = hyps.iter().map(|h| h.family).collect();
        assert_eq!(families, Family::ALL.to_vec());
    }

    #[test]
    fn picks_phrasing_by_sign() {
        let recent = MetricSet { roas: 2.0, ctr: 0.02, spend: 50.0, impressions: 100.0, purchases: 1.0, ..Default::default() };
        let previous = MetricSet { roas: 4.0, ctr: 0.01, spend: 80.0, impressions: 100.0, purchases: 3.0, ..Default::default() };
        let hyps = generate(&recent, &previous);
        assert!(hyps[0].text.starts_with("ROAS dropped"));
        assert_eq!(hyps[0].direction, Direction::Decline);
        assert!(hyps[1].text.starts_with("CTR improved"));
        assert!(hyps[2].text.starts_with("Spend decreased"));
        // equal values take the improvement phrasing
        assert!(hyps[3].text.starts_with("Impressions increased"));
        assert_eq!(hyps[3].direction, Direction::Improve);
        assert!(hyps[4].text.starts_with("Purchases down"));
    }

    #[test]
    fn zero_metrics_still_produce_five() {
        let hyps = generate(&MetricSet::default(), &MetricSet::default());
        assert_eq!(hyps.len(), 5);
        assert!(hyps.iter().all(|h| h.direction == Direction::Improve));
    }

    #[test]
    fn deterministic_output() {
        let recent = MetricSet { roas: 1.0, ..Default::default() };
        let previous = MetricSet { roas: 3.0, ..Default::default() };
        assert_eq!(generate(&recent, &previous), generate(&recent, &previous));
    }
}
