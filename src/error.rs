use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed reading table {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no input tables found matching {0}")]
    NoInputFiles(String),
    #[error("table {table} has no header row (skip_rows = {skip_rows})")]
    MissingHeader { table: String, skip_rows: usize },
    #[error("table {table} is missing required column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("failed serializing report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed parsing config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
