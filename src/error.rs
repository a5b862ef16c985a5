use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Dataset error: {0}")]
    Dataset(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
