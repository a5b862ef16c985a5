use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_DATASET_PATH: &str = "data/synthetic_fb_ads_undergarments.csv";

/// Backoff between attempts to open the dataset, in milliseconds.
/// One attempt per entry plus the initial one.
pub const LOAD_RETRY_BACKOFF_MS: &[u64] = &[500, 1000, 2000];

/// CTR (as a fraction) below which creative copy switches to an urgency CTA.
pub const URGENT_CTR_CUTOFF: f64 = 0.01;

/// Fixed scoring constants for hypothesis evaluation.
/// Families without a configured threshold use the `*_THRESHOLD_PCT` heuristics.
pub mod heuristics {
    pub const IMPRESSIONS_THRESHOLD_PCT: f64 = 5.0;
    pub const PURCHASES_THRESHOLD_PCT: f64 = 10.0;

    /// Weight applied to the magnitude score when the claimed direction matches.
    pub const DIRECTION_MATCH_WEIGHT: f64 = 0.9;
    pub const DIRECTION_MISMATCH_WEIGHT: f64 = 0.5;
    pub const SPEND_WEIGHT: f64 = 0.7;
    pub const IMPRESSIONS_WEIGHT: f64 = 0.7;
    pub const PURCHASES_WEIGHT: f64 = 0.85;
    pub const FALLBACK_WEIGHT: f64 = 0.5;

    pub const LOW_CTR_BONUS: f64 = 0.15;

    pub const ROAS_CUTOFF: f64 = 0.25;
    pub const CTR_CUTOFF: f64 = 0.3;
    pub const SPEND_CUTOFF: f64 = 0.25;
    /// Impressions validate on raw |percent change| rather than on confidence.
    pub const IMPRESSIONS_MIN_ABS_CHANGE_PCT: f64 = 3.0;
    pub const PURCHASES_SCORE_CUTOFF: f64 = 0.25;
    pub const FALLBACK_SCORE_CUTOFF: f64 = 0.4;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub thresholds: Thresholds,
    pub evaluation: EvaluationConfig,
    pub creative: CreativeConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    #[serde(alias = "path")]
    pub dataset_path: PathBuf,
    /// Keep only the first `sample_n` rows (deterministic head).
    #[serde(alias = "sample_mode")]
    pub sample: bool,
    pub sample_n: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            sample: false,
            sample_n: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Length of both the recent and the previous window, in days.
    pub lookback_days: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { lookback_days: 7 }
    }
}

/// Thresholds are stored as fractions (0.20 = 20%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub roas_drop_pct: f64,
    pub ctr_drop_pct: f64,
    pub ctr_low_threshold: f64,
    /// Reserved; not read by the scoring formulas.
    pub roas_low_threshold: f64,
    /// Reserved; not read by the scoring formulas.
    pub spend_high_pctile: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            roas_drop_pct: 0.20,
            ctr_drop_pct: 0.15,
            ctr_low_threshold: 0.01,
            roas_low_threshold: 0.5,
            spend_high_pctile: 0.9,
        }
    }
}

impl Thresholds {
    pub fn roas_threshold_pct(&self) -> f64 {
        self.roas_drop_pct * 100.0
    }

    pub fn ctr_threshold_pct(&self) -> f64 {
        self.ctr_drop_pct * 100.0
    }

    pub fn ctr_low_threshold_pct(&self) -> f64 {
        self.ctr_low_threshold * 100.0
    }
}

/// How the evaluator learns which metric family a hypothesis is about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Use the family/direction tags attached by the generator.
    #[default]
    Tagged,
    /// Re-derive family and direction from the statement text by keyword priority.
    Text,
}

impl std::fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationMode::Tagged => write!(f, "tagged"),
            EvaluationMode::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub mode: EvaluationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeConfig {
    pub max_ideas: usize,
}

impl Default for CreativeConfig {
    fn default() -> Self {
        Self { max_ideas: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub reports_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `ads_insight=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Read and validate a YAML config file. An empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let cfg = Self::from_yaml(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `LOG_LEVEL`, `DATASET_PATH`, `REPORTS_DIR` and `LOOKBACK_DAYS`
    /// from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(path) = lookup("DATASET_PATH") {
            self.data.dataset_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("REPORTS_DIR") {
            self.output.reports_dir = PathBuf::from(dir);
        }
        if let Some(days) = lookup("LOOKBACK_DAYS") {
            self.analysis.lookback_days = days.trim().parse::<i64>().map_err(|_| {
                AppError::Config("LOOKBACK_DAYS must be a whole number of days".to_string())
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.lookback_days < 1 {
            return Err(AppError::Config(format!(
                "analysis.lookback_days must be >= 1 (got {})",
                self.analysis.lookback_days
            )));
        }
        if self.data.sample && self.data.sample_n == 0 {
            return Err(AppError::Config(
                "data.sample_n must be > 0 when sampling is enabled".to_string(),
            ));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("roas_drop_pct", t.roas_drop_pct),
            ("ctr_drop_pct", t.ctr_drop_pct),
            ("ctr_low_threshold", t.ctr_low_threshold),
            ("roas_low_threshold", t.roas_low_threshold),
            ("spend_high_pctile", t.spend_high_pctile),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Config(format!(
                    "thresholds.{name} must be a non-negative number (got {value})"
                )));
            }
        }
        if t.spend_high_pctile > 1.0 {
            return Err(AppError::Config(format!(
                "thresholds.spend_high_pctile must be within [0, 1] (got {})",
                t.spend_high_pctile
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(AppError::Config("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = Config::from_yaml("  \n").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.analysis.lookback_days, 7);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_document_fills_missing_fields() {
        let raw = r#"
analysis:
  lookback_days: 14
thresholds:
  roas_drop_pct: 0.3
evaluation:
  mode: text
"#;
        let cfg = Config::from_yaml(raw).unwrap();
        assert_eq!(cfg.analysis.lookback_days, 14);
        assert!((cfg.thresholds.roas_threshold_pct() - 30.0).abs() < 1e-9);
        assert!((cfg.thresholds.ctr_threshold_pct() - 15.0).abs() < 1e-9);
        assert_eq!(cfg.evaluation.mode, EvaluationMode::Text);
        assert_eq!(cfg.creative.max_ideas, 8);
    }

    #[test]
    fn legacy_data_aliases_are_accepted() {
        let raw = r#"
data:
  path: data/ads.csv
  sample_mode: true
  sample_n: 50
"#;
        let cfg = Config::from_yaml(raw).unwrap();
        assert_eq!(cfg.data.dataset_path, PathBuf::from("data/ads.csv"));
        assert!(cfg.data.sample);
        assert_eq!(cfg.data.sample_n, 50);
    }

    #[test]
    fn rejects_non_positive_lookback() {
        let mut cfg = Config::default();
        cfg.analysis.lookback_days = 0;
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_negative_threshold() {
        let mut cfg = Config::default();
        cfg.thresholds.ctr_drop_pct = -0.1;
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOG_LEVEL", "debug"),
            ("REPORTS_DIR", "out"),
            ("LOOKBACK_DAYS", "3"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.output.reports_dir, PathBuf::from("out"));
        assert_eq!(cfg.analysis.lookback_days, 3);
        assert_eq!(cfg.data.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn bad_lookback_override_is_a_config_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|k| (k == "LOOKBACK_DAYS").then(|| "a week".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
