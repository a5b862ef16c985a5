use crate::types::{Direction, Family, Hypothesis};

/// Which evidence a hypothesis is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Family(Family),
    /// No family keyword matched; scored on ROAS with a reduced weight.
    Fallback,
}

/// What a hypothesis asserts, independent of how it was learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub route: Route,
    /// True when the statement asserts the metric went down.
    pub expects_decline: bool,
}

impl Claim {
    /// Read the claim straight off the generator's tags.
    pub fn from_tags(h: &Hypothesis) -> Self {
        Self {
            route: Route::Family(h.family),
            expects_decline: h.direction == Direction::Decline,
        }
    }

    /// Re-derive the claim from statement text by keyword matching.
    pub fn from_text(text: &str) -> Self {
        let route = classify(text);
        let lower = text.to_lowercase();
        let expects_decline = match route {
            Route::Family(family) => implies_decline(&lower, family),
            Route::Fallback => false,
        };
        Self { route, expects_decline }
    }
}

/// Keyword routing, first match wins:
/// roas > ctr/click > spend > impression/audience/frequency > purchase/conversion/cpa.
///
/// A statement naming two families resolves to the earlier one, e.g.
/// the Spend-increase statement mentions CTR and so routes to CTR.
pub fn classify(text: &str) -> Route {
    let lower = text.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

    if has(&["roas"]) {
        Route::Family(Family::Roas)
    } else if has(&["ctr", "click"]) {
        Route::Family(Family::Ctr)
    } else if has(&["spend"]) {
        Route::Family(Family::Spend)
    } else if has(&["impression", "audience", "frequency"]) {
        Route::Family(Family::Impressions)
    } else if has(&["purchase", "conversion", "cpa"]) {
        Route::Family(Family::Purchases)
    } else {
        Route::Fallback
    }
}

/// Decline keywords differ per family; Spend and Impressions ignore direction.
fn implies_decline(lower: &str, family: Family) -> bool {
    let keys: &[&str] = match family {
        Family::Roas => &["drop", "fell", "decrease"],
        Family::Ctr => &["drop", "fell", "decrease", "fatigu"],
        Family::Purchases => &["down", "drop", "fell"],
        Family::Spend | Family::Impressions => &[],
    };
    keys.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::hypothesis::statement;

    #[test]
    fn priority_order_first_match_wins() {
        assert_eq!(classify("ROAS fell while CTR rose"), Route::Family(Family::Roas));
        assert_eq!(classify("Fewer clicks than last week"), Route::Family(Family::Ctr));
        assert_eq!(classify("Spend on audience X"), Route::Family(Family::Spend));
        assert_eq!(classify("Audience frequency is high"), Route::Family(Family::Impressions));
        assert_eq!(classify("Conversion rate slipped"), Route::Family(Family::Purchases));
        assert_eq!(classify("CPA went up"), Route::Family(Family::Purchases));
    }

    #[test]
    fn unmatched_text_falls_back() {
        assert_eq!(classify("Weather was unusually warm."), Route::Fallback);
        let claim = Claim::from_text("");
        assert_eq!(claim.route, Route::Fallback);
        assert!(!claim.expects_decline);
    }

    #[test]
    fn spend_increase_statement_routes_to_ctr_by_text() {
        let h = statement(Family::Spend, Direction::Improve);
        assert_eq!(Claim::from_text(&h.text).route, Route::Family(Family::Ctr));
        assert_eq!(Claim::from_tags(&h).route, Route::Family(Family::Spend));
    }

    #[test]
    fn catalogue_text_agrees_with_tags_elsewhere() {
        for family in Family::ALL {
            for direction in [Direction::Decline, Direction::Improve] {
                if (family, direction) == (Family::Spend, Direction::Improve) {
                    continue;
                }
                let h = statement(family, direction);
                let text = Claim::from_text(&h.text);
                let tags = Claim::from_tags(&h);
                assert_eq!(text.route, tags.route, "{}", h.text);
                if matches!(family, Family::Roas | Family::Ctr | Family::Purchases) {
                    assert_eq!(text.expects_decline, tags.expects_decline, "{}", h.text);
                }
            }
        }
    }

    #[test]
    fn fatigue_counts_as_decline_only_for_ctr() {
        assert!(Claim::from_text("CTR shows creative fatigue").expects_decline);
        assert!(!Claim::from_text("ROAS under creative fatigue").expects_decline);
    }

    #[test]
    fn purchases_use_down_keyword() {
        assert!(Claim::from_text("Purchases down this week").expects_decline);
        assert!(!Claim::from_text("Purchases decreased").expects_decline);
    }
}
