mod config;
mod creative;
mod error;
mod evaluator;
mod insight;
mod loader;
mod planner;
mod report;
mod types;

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::error::Result;
use crate::evaluator::HypothesisEvaluator;
use crate::report::{ReportWriter, RunOutput};

/// Explain an ads performance change and suggest creative refreshes.
#[derive(Debug, Parser)]
#[command(name = "ads-insight", version)]
struct Cli {
    /// What to analyse, e.g. "Analyze ROAS drop".
    query: String,

    /// YAML config file.
    #[arg(long, env = "ADS_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset CSV; overrides `data.dataset_path`.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Output directory; overrides `output.reports_dir`.
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Maximum creative ideas; overrides `creative.max_ideas`.
    #[arg(long)]
    max_ideas: Option<usize>,

    /// Window length in days; overrides `analysis.lookback_days`.
    #[arg(long)]
    lookback_days: Option<i64>,

    /// Extra statement to validate alongside the generated ones (repeatable).
    /// Routed to a metric family by keyword.
    #[arg(long = "hypothesis", value_name = "TEXT")]
    hypotheses: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let (cfg, config_source) = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.logging.level))
        .init();
    match &config_source {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => warn!("No config file at {DEFAULT_CONFIG_PATH}; running with defaults"),
    }

    if let Err(e) = run(&cli.query, &cli.hypotheses, &cfg) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// File (explicit path must exist; the default path may be absent), then env, then flags.
fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let (mut cfg, source) = match &cli.config {
        Some(path) => (Config::load(path)?, Some(path.clone())),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                (Config::load(&default)?, Some(default))
            } else {
                (Config::default(), None)
            }
        }
    };

    cfg.apply_env()?;
    if let Some(path) = &cli.dataset {
        cfg.data.dataset_path = path.clone();
    }
    if let Some(dir) = &cli.reports_dir {
        cfg.output.reports_dir = dir.clone();
    }
    if let Some(n) = cli.max_ideas {
        cfg.creative.max_ideas = n;
    }
    if let Some(days) = cli.lookback_days {
        cfg.analysis.lookback_days = days;
    }
    cfg.validate()?;
    Ok((cfg, source))
}

fn run(query: &str, extra_hypotheses: &[String], cfg: &Config) -> Result<()> {
    let plan = planner::plan(query);
    info!(steps = ?plan.steps, notes = ?plan.notes, "Plan for query \"{query}\"");

    // --- Load ---
    let (records, dataset) = loader::load_dataset(&cfg.data)?;

    // --- Insight + evaluation ---
    let insight = insight::analyze(&records, cfg.analysis.lookback_days);
    let evaluator = HypothesisEvaluator::new(cfg);
    let mut validated = evaluator.evaluate(&insight);
    if !extra_hypotheses.is_empty() {
        validated.extend(evaluator.evaluate_statements(
            &insight.percent_changes,
            &insight.recent_window,
            &insight.previous_window,
            extra_hypotheses,
        ));
    }

    // --- Creatives for the weakest-CTR campaign ---
    let creatives = match creative::lowest_ctr_campaign(&records) {
        Some(pick) => {
            info!(
                campaign = %pick.campaign_name,
                mean_ctr = pick.mean_ctr,
                "Generating creatives for lowest-CTR campaign"
            );
            Some(creative::generate_creatives(
                &pick.campaign_name,
                &pick.current_message,
                Some(pick.mean_ctr),
                cfg.creative.max_ideas,
            ))
        }
        None => {
            warn!("No campaign with usable clicks/impressions; skipping creative generation");
            None
        }
    };

    // --- Write ---
    let writer = ReportWriter::new(&cfg.output.reports_dir);
    let written = writer.write_all(&RunOutput {
        plan: &plan,
        insight: &insight,
        validated: &validated,
        creatives: creatives.as_ref(),
        dataset: &dataset,
        config: cfg,
        generated_at: Utc::now(),
    })?;

    let successes = validated.iter().filter(|v| v.validated).count();
    println!("\n=== RUN SUMMARY ===");
    println!("Validated insights: {successes} / {}", validated.len());
    if let Some(bundle) = &creatives {
        println!("Creative ideas generated for campaign: {}", bundle.campaign_name);
    } else {
        println!("No campaign selected for creative generation.");
    }
    let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    println!("Outputs ({}): {}", writer.dir().display(), paths.join(", "));

    Ok(())
}
