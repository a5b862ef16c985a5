use tracing::debug;

use crate::config::URGENT_CTR_CUTOFF;
use crate::types::CreativeBundle;

/// Expanded template-major, headline-minor. Reordering changes which ideas
/// survive the `max_ideas` cap.
const TEMPLATES: [&str; 5] = [
    "{headline} — {benefit}. {cta}",
    "{headline}: {benefit} — {cta}",
    "{emotion} {headline}. {cta}",
    "{headline} — limited time: {cta}",
    "{question} {headline}? {cta}",
];

const FALLBACK_HEADLINES: [&str; 2] = ["Comfort You’ll Actually Love", "Engineered For Everyday Comfort"];
const MAX_HEADLINES: usize = 5;

/// Checked in order; the first one present in the message picks the benefit.
const BENEFIT_KEYWORDS: [&str; 6] = ["comfort", "breathable", "support", "stretch", "ride-up", "fit"];
const DEFAULT_BENEFIT: &str = "all-day comfort";

const EMOTION: &str = "Try the comfort";
const QUESTION: &str = "Tired of riding up?";

const URGENT_CTA: &str = "Limited stock — shop now";
const NEUTRAL_CTA: &str = "Shop now";
/// Templates take at most this many words of CTA; longer ones become `NEUTRAL_CTA`.
const TEMPLATE_CTA_MAX_WORDS: usize = 3;

/// Lower-case, turn punctuation into spaces, keep tokens longer than three
/// characters, first occurrence wins.
pub fn extract_keywords(message: &str) -> Vec<String> {
    let cleaned: String = message
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut out: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() > 3 && !out.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn pick_headlines(keywords: &[String]) -> Vec<String> {
    if keywords.is_empty() {
        return FALLBACK_HEADLINES.iter().map(|h| h.to_string()).collect();
    }

    let mut candidates = vec![capitalize(&keywords[0])];
    if let Some(second) = keywords.get(1) {
        candidates.push(format!("{} {}", capitalize(&keywords[0]), capitalize(second)));
    }
    if keywords.iter().any(|k| k == "comfort") {
        candidates.push("All-day Comfort".to_string());
    }
    if keywords.iter().any(|k| k == "breathable") {
        candidates.push("Breathable Design".to_string());
    }

    let mut out: Vec<String> = Vec::new();
    for h in candidates {
        if !out.contains(&h) {
            out.push(h);
        }
    }
    out.truncate(MAX_HEADLINES);
    out
}

pub fn pick_benefit(keywords: &[String]) -> String {
    let found = BENEFIT_KEYWORDS
        .iter()
        .find(|b| keywords.iter().any(|k| k == *b));
    match found {
        Some(&"comfort") => "all-day comfort".to_string(),
        Some(&"breathable") => "breathable fabric".to_string(),
        Some(other) => format!("{other} benefits"),
        None => DEFAULT_BENEFIT.to_string(),
    }
}

pub fn pick_cta(ctr: Option<f64>) -> &'static str {
    match ctr {
        Some(v) if v < URGENT_CTR_CUTOFF => URGENT_CTA,
        _ => NEUTRAL_CTA,
    }
}

fn template_cta(cta: &str) -> &str {
    if cta.split_whitespace().count() <= TEMPLATE_CTA_MAX_WORDS {
        cta
    } else {
        NEUTRAL_CTA
    }
}

fn render(template: &str, headline: &str, benefit: &str, cta: &str) -> String {
    template
        .replace("{headline}", headline)
        .replace("{benefit}", benefit)
        .replace("{cta}", cta)
        .replace("{emotion}", EMOTION)
        .replace("{question}", QUESTION)
}

/// Build up to `max_ideas` deduplicated ad-copy variants for one campaign.
/// Fully deterministic.
pub fn generate_creatives(
    campaign_name: &str,
    current_message: &str,
    ctr: Option<f64>,
    max_ideas: usize,
) -> CreativeBundle {
    let keywords = extract_keywords(current_message);
    let headlines = pick_headlines(&keywords);
    let benefit = pick_benefit(&keywords);
    let cta = pick_cta(ctr);
    let short_cta = template_cta(cta);

    let mut ideas: Vec<String> = Vec::new();
    if max_ideas > 0 {
        'templates: for template in TEMPLATES {
            for headline in &headlines {
                let idea = render(template, headline, &benefit, short_cta);
                if !ideas.contains(&idea) {
                    ideas.push(idea);
                }
                if ideas.len() >= max_ideas {
                    break 'templates;
                }
            }
        }

        if ideas.len() < max_ideas {
            if let Some(first) = keywords.first() {
                ideas.push(format!("{} that works — {benefit}. {cta}", capitalize(first)));
            }
        }
        if ideas.len() < max_ideas {
            ideas.push(format!("See why thousands prefer {campaign_name}. {cta}"));
        }
        ideas.truncate(max_ideas);
    }

    let mut rationale = vec![
        format!(
            "Derived {} headline anchors from creative message keywords: {}.",
            headlines.len(),
            keywords.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
        ),
        format!("Focused on benefit: {benefit}."),
    ];
    if let Some(v) = ctr {
        rationale.push(format!("CTR observed: {v:.4} — used to decide CTA urgency."));
    }

    debug!(
        campaign = campaign_name,
        keywords = keywords.len(),
        headlines = headlines.len(),
        ideas = ideas.len(),
        "Creative ideas generated"
    );

    CreativeBundle {
        campaign_name: campaign_name.to_string(),
        current_message: current_message.to_string(),
        ctr,
        ideas,
        rationale: rationale.join(" "),
    }
}
