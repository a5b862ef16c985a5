use std::collections::BTreeMap;

use crate::types::Record;

/// The campaign chosen as the creative-refresh target.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignPick {
    pub campaign_name: String,
    /// Mean of per-row CTR across the campaign's rows.
    pub mean_ctr: f64,
    /// First non-empty creative message of the campaign, in file order.
    pub current_message: String,
}

/// Pick the campaign with the lowest mean per-row CTR.
///
/// Per-row CTR divides by 1 when impressions are 0. Rows missing clicks or
/// impressions are skipped. Ties go to the lexicographically smallest name.
pub fn lowest_ctr_campaign(records: &[Record]) -> Option<CampaignPick> {
    // name → (sum of row CTR, rows)
    let mut per_campaign: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in records {
        if r.campaign_name.is_empty() {
            continue;
        }
        let (Some(clicks), Some(impressions)) = (r.clicks, r.impressions) else {
            continue;
        };
        let denom = if impressions == 0.0 { 1.0 } else { impressions };
        let entry = per_campaign.entry(r.campaign_name.as_str()).or_insert((0.0, 0));
        entry.0 += clicks / denom;
        entry.1 += 1;
    }

    let (name, mean_ctr) = per_campaign
        .into_iter()
        .map(|(name, (sum, n))| (name, sum / n as f64))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)))?;

    let current_message = records
        .iter()
        .filter(|r| r.campaign_name == name)
        .map(|r| r.creative_message.as_str())
        .find(|m| !m.is_empty())
        .unwrap_or_default()
        .to_string();

    Some(CampaignPick {
        campaign_name: name.to_string(),
        mean_ctr,
        current_message,
    })
}
