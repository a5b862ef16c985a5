use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{DataConfig, LOAD_RETRY_BACKOFF_MS};
use crate::error::{AppError, Result};
use crate::types::Record;

/// Columns every dataset must carry. Anything else is kept in the summary but ignored.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "date",
    "campaign_name",
    "adset_name",
    "creative_message",
    "spend",
    "impressions",
    "clicks",
    "purchases",
    "revenue",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    /// column → number of empty cells
    pub missing_values: BTreeMap<String, usize>,
    pub unparseable_dates: usize,
    /// Non-empty numeric cells that failed to parse and will count as 0.
    pub coerced_numeric: usize,
    /// Rows the CSV reader could not decode at all.
    pub skipped_rows: usize,
    pub sampled: bool,
}

/// Column positions of the required fields, resolved once from the header row.
struct ColumnIndex {
    date: usize,
    campaign_name: usize,
    adset_name: usize,
    creative_message: usize,
    spend: usize,
    impressions: usize,
    clicks: usize,
    purchases: usize,
    revenue: usize,
}

/// Load the configured dataset, honouring sample mode.
pub fn load_dataset(cfg: &DataConfig) -> Result<(Vec<Record>, DatasetSummary)> {
    let file = open_with_retry(&cfg.dataset_path)?;
    let limit = cfg.sample.then_some(cfg.sample_n);
    let (records, summary) = read_records(file, limit)?;

    info!(
        rows = summary.rows,
        columns = summary.columns.len(),
        unparseable_dates = summary.unparseable_dates,
        coerced_numeric = summary.coerced_numeric,
        sampled = summary.sampled,
        "Loaded {} rows from {}",
        summary.rows,
        cfg.dataset_path.display(),
    );
    Ok((records, summary))
}

/// Parse CSV from any reader. `limit` keeps only the first N data rows.
pub fn read_records<R: Read>(reader: R, limit: Option<usize>) -> Result<(Vec<Record>, DatasetSummary)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let header_map: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let index = resolve_columns(&header_map)?;
    info!("Schema validation passed: all {} required columns present", REQUIRED_COLUMNS.len());

    let mut summary = DatasetSummary {
        columns: columns.clone(),
        missing_values: columns.iter().map(|c| (c.clone(), 0)).collect(),
        sampled: limit.is_some(),
        ..Default::default()
    };
    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        if limit.is_some_and(|n| records.len() >= n) {
            break;
        }
        // +2: header is line 1, CSV lines are 1-based
        let line = idx + 2;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(line, "Skipping undecodable CSV row: {e}");
                summary.skipped_rows += 1;
                continue;
            }
        };

        for (col, name) in columns.iter().enumerate() {
            if row.get(col).map_or(true, str::is_empty) {
                if let Some(count) = summary.missing_values.get_mut(name) {
                    *count += 1;
                }
            }
        }

        let record = parse_row(&row, &index, &mut summary);
        if record.date.is_none() {
            debug!(line, raw = field(&row, index.date), "Unparseable date");
        }
        records.push(record);
    }

    summary.rows = records.len();
    if summary.skipped_rows > 0 {
        warn!(skipped = summary.skipped_rows, "Some CSV rows could not be decoded and were skipped");
    }
    if records.is_empty() {
        warn!("Dataset has a header but no data rows; metrics will read as 0");
    }
    Ok((records, summary))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<&str, usize>) -> Result<ColumnIndex> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        error!(?missing, "Schema validation failed");
        return Err(AppError::Schema { missing });
    }

    let at = |name: &str| header_map[name];
    Ok(ColumnIndex {
        date: at("date"),
        campaign_name: at("campaign_name"),
        adset_name: at("adset_name"),
        creative_message: at("creative_message"),
        spend: at("spend"),
        impressions: at("impressions"),
        clicks: at("clicks"),
        purchases: at("purchases"),
        revenue: at("revenue"),
    })
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn parse_row(row: &StringRecord, index: &ColumnIndex, summary: &mut DatasetSummary) -> Record {
    let date = parse_date(field(row, index.date));
    if date.is_none() {
        summary.unparseable_dates += 1;
    }

    let mut number = |idx: usize| {
        let raw = field(row, idx);
        let value = parse_number(raw);
        if value.is_none() && !raw.is_empty() {
            summary.coerced_numeric += 1;
        }
        value
    };

    Record {
        date,
        spend: number(index.spend),
        impressions: number(index.impressions),
        clicks: number(index.clicks),
        purchases: number(index.purchases),
        revenue: number(index.revenue),
        campaign_name: field(row, index.campaign_name).to_string(),
        adset_name: field(row, index.adset_name).to_string(),
        creative_message: field(row, index.creative_message).to_string(),
    }
}

/// Parse a date or date-time cell. Plain dates land at midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc())
}

/// Empty, non-numeric and non-finite cells are `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn open_with_retry(path: &Path) -> Result<File> {
    let mut attempt = 0usize;
    loop {
        match File::open(path) {
            Ok(file) => return Ok(file),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::Dataset(format!("dataset not found: {}", path.display())));
            }
            Err(e) => {
                let Some(&delay_ms) = LOAD_RETRY_BACKOFF_MS.get(attempt) else {
                    error!("All {} retries failed opening {}", LOAD_RETRY_BACKOFF_MS.len(), path.display());
                    return Err(e.into());
                };
                attempt += 1;
                warn!(
                    "Open attempt {attempt}/{} for {} failed: {e}. Retrying in {delay_ms}ms",
                    LOAD_RETRY_BACKOFF_MS.len(),
                    path.display(),
                );
                std::thread::sleep(Duration::from_millis(delay_ms));
            }
        }
    }
}
