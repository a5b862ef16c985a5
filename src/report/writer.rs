use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::loader::DatasetSummary;
use crate::planner::Plan;
use crate::types::{CreativeBundle, InsightResult, ValidatedHypothesis};

pub const RAW_INSIGHTS_FILE: &str = "insight_result_raw.json";
pub const INSIGHTS_FILE: &str = "insights.json";
pub const CREATIVES_FILE: &str = "creatives.json";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";
pub const REPORT_FILE: &str = "report.md";

/// Everything one run produced, borrowed for writing.
pub struct RunOutput<'a> {
    pub plan: &'a Plan,
    pub insight: &'a InsightResult,
    pub validated: &'a [ValidatedHypothesis],
    pub creatives: Option<&'a CreativeBundle>,
    pub dataset: &'a DatasetSummary,
    pub config: &'a Config,
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct InsightsFile<'a> {
    validated_hypotheses: &'a [ValidatedHypothesis],
}

#[derive(Serialize)]
struct RunSummaryFile<'a> {
    plan: &'a Plan,
    dataset: &'a DatasetSummary,
    generated_at: DateTime<Utc>,
}

/// Writes run artifacts into one reports directory. Each file is written once per run.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write every artifact and return the paths written, in order.
    pub fn write_all(&self, out: &RunOutput<'_>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let mut written = Vec::new();

        written.push(self.write_json(RAW_INSIGHTS_FILE, out.insight)?);
        written.push(self.write_json(
            INSIGHTS_FILE,
            &InsightsFile {
                validated_hypotheses: out.validated,
            },
        )?);
        if let Some(bundle) = out.creatives {
            written.push(self.write_json(CREATIVES_FILE, bundle)?);
        }
        written.push(self.write_json(
            RUN_SUMMARY_FILE,
            &RunSummaryFile {
                plan: out.plan,
                dataset: out.dataset,
                generated_at: out.generated_at,
            },
        )?);

        let path = self.dir.join(REPORT_FILE);
        fs::write(&path, render_markdown(out)?)?;
        info!("Saved report to {}", path.display());
        written.push(path);

        Ok(written)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(value)?;
        fs::write(&path, body)?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

pub fn render_markdown(out: &RunOutput<'_>) -> Result<String> {
    let config_json = serde_json::to_string_pretty(out.config)?;
    let mut md = String::new();
    write_markdown(&mut md, out, &config_json)?;
    Ok(md)
}

fn write_markdown(md: &mut String, out: &RunOutput<'_>, config_json: &str) -> fmt::Result {
    writeln!(md, "# Facebook Ads Agentic Analysis Report\n")?;
    writeln!(md, "Generated: {}\n", out.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(md, "Query: {}\n", out.plan.query)?;

    writeln!(md, "## Quick summary\n")?;
    let top: Vec<&ValidatedHypothesis> = out.validated.iter().filter(|h| h.validated).collect();
    if top.is_empty() {
        writeln!(md, "No high-confidence validated hypotheses found. See details below.")?;
    } else {
        writeln!(md, "Top validated insights:\n")?;
        for h in top {
            writeln!(md, "- {} — {} (confidence: {})", h.hypothesis, h.evidence, h.confidence)?;
        }
    }

    writeln!(md, "\n## Validated Insights (full)\n")?;
    for h in out.validated {
        writeln!(md, "### {}\n", h.hypothesis)?;
        writeln!(md, "- Evidence: {}", h.evidence)?;
        writeln!(md, "- Confidence: {}", h.confidence)?;
        writeln!(md, "- Validated: {}\n", h.validated)?;
    }

    writeln!(md, "## Creative Recommendations\n")?;
    match out.creatives {
        Some(bundle) if !bundle.ideas.is_empty() => {
            writeln!(md, "Campaign: {}\n", bundle.campaign_name)?;
            for (i, idea) in bundle.ideas.iter().enumerate() {
                writeln!(md, "{}. {idea}", i + 1)?;
            }
            writeln!(md, "\nRationale:\n\n{}", bundle.rationale)?;
        }
        _ => writeln!(md, "No creative recommendations generated.")?,
    }

    let w = &out.insight.windows;
    writeln!(md, "\n## Data\n")?;
    writeln!(md, "- Rows analysed: {}", out.dataset.rows)?;
    let latest = w
        .max_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "n/a".to_string());
    writeln!(md, "- Latest date: {latest}")?;
    writeln!(
        md,
        "- Lookback: {} days (recent rows: {}, previous rows: {})",
        w.lookback_days, w.recent_rows, w.previous_rows
    )?;
    writeln!(md, "- Rows without a usable date: {}", w.dropped_undated)?;
    writeln!(md, "- Numeric cells coerced to 0: {}", out.dataset.coerced_numeric)?;

    writeln!(md, "\n## Plan\n")?;
    for (i, step) in out.plan.steps.iter().enumerate() {
        writeln!(md, "{}. {step}", i + 1)?;
    }
    for note in &out.plan.notes {
        writeln!(md, "\n> {note}")?;
    }

    writeln!(md, "\n## Config snapshot\n")?;
    writeln!(md, "```json\n{config_json}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan_at;
    use crate::types::{MetricSet, PercentChangeSet, WindowSummary};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn insight() -> InsightResult {
        InsightResult {
            recent_window: MetricSet::default(),
            previous_window: MetricSet::default(),
            percent_changes: PercentChangeSet::default(),
            hypotheses: Vec::new(),
            windows: WindowSummary {
                lookback_days: 7,
                ..Default::default()
            },
        }
    }

    fn validated() -> Vec<ValidatedHypothesis> {
        vec![
            ValidatedHypothesis {
                hypothesis: "ROAS dropped — possible cause: spend increased faster than revenue.".to_string(),
                evidence: "roas changed by -50.00% (recent: 2, previous: 4)".to_string(),
                confidence: 0.9,
                validated: true,
            },
            ValidatedHypothesis {
                hypothesis: "Impressions increased — reach expanded.".to_string(),
                evidence: "impressions changed by 1.00% (recent: 101, previous: 100)".to_string(),
                confidence: 0.14,
                validated: false,
            },
        ]
    }

    #[test]
    fn writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        let insight = insight();
        let validated = validated();
        let bundle = CreativeBundle {
            campaign_name: "Camp".to_string(),
            current_message: "Soft cotton".to_string(),
            ctr: Some(0.004),
            ideas: vec!["Soft — all-day comfort. Shop now".to_string()],
            rationale: "Focused on benefit: all-day comfort.".to_string(),
        };
        let dataset = DatasetSummary {
            rows: 12,
            coerced_numeric: 2,
            ..Default::default()
        };
        let config = Config::default();
        let plan = plan_at("Analyze ROAS drop", at());
        let out = RunOutput {
            plan: &plan,
            insight: &insight,
            validated: &validated,
            creatives: Some(&bundle),
            dataset: &dataset,
            config: &config,
            generated_at: at(),
        };

        let written = ReportWriter::new(&reports).write_all(&out).unwrap();
        assert_eq!(written.len(), 5);
        for p in &written {
            assert!(p.exists(), "{}", p.display());
        }

        let raw = fs::read_to_string(reports.join(INSIGHTS_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["validated_hypotheses"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["validated_hypotheses"][0]["validated"], true);

        let creatives: CreativeBundle =
            serde_json::from_str(&fs::read_to_string(reports.join(CREATIVES_FILE)).unwrap()).unwrap();
        assert_eq!(creatives, bundle);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(reports.join(RUN_SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(summary["plan"]["query"], "Analyze ROAS drop");
        assert_eq!(summary["plan"]["steps"][2], "detect_roas_changes");
        assert_eq!(summary["dataset"]["rows"], 12);
        assert_eq!(summary["dataset"]["coerced_numeric"], 2);
    }

    #[test]
    fn markdown_lists_validated_first_and_handles_missing_creatives() {
        let insight = insight();
        let validated = validated();
        let dataset = DatasetSummary::default();
        let config = Config::default();
        let plan = plan_at("Analyze ROAS drop", at());
        let out = RunOutput {
            plan: &plan,
            insight: &insight,
            validated: &validated,
            creatives: None,
            dataset: &dataset,
            config: &config,
            generated_at: at(),
        };
        let md = render_markdown(&out).unwrap();
        assert!(md.contains("Generated: 2024-06-01 09:30 UTC"));
        assert!(md.contains("Top validated insights:"));
        assert!(md.contains("- ROAS dropped — possible cause: spend increased faster than revenue. — roas changed by -50.00%"));
        assert!(!md.contains("- Impressions increased — reach expanded. —"));
        assert!(md.contains("No creative recommendations generated."));
        assert!(md.contains("\"lookback_days\": 7"));
        assert!(md.contains("Query: Analyze ROAS drop"));
        assert!(md.contains("3. detect_roas_changes"));
    }

    #[test]
    fn markdown_without_validated_hypotheses() {
        let insight = insight();
        let mut validated = validated();
        validated[0].validated = false;
        let dataset = DatasetSummary::default();
        let config = Config::default();
        let plan = plan_at("Analyze ROAS drop", at());
        let out = RunOutput {
            plan: &plan,
            insight: &insight,
            validated: &validated,
            creatives: None,
            dataset: &dataset,
            config: &config,
            generated_at: at(),
        };
        let md = render_markdown(&out).unwrap();
        assert!(md.contains("No high-confidence validated hypotheses found."));
    }
}
