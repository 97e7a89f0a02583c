use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised by the ingestion pipelines.
///
/// The slug generator is total and never produces one of these.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("row {row}: missing column `{column}`")]
    MissingColumn { row: usize, column: String },

    #[error("row {row}: invalid value {value:?} in column `{column}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid value {value:?} for environment variable {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}

impl IngestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
