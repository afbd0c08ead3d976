use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum CondenseError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(String),
    #[error("Invalid root directory {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
    #[error("Invalid output path {path}: {reason}")]
    InvalidOutput { path: PathBuf, reason: String },
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
impl CondenseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CondenseError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn pattern(pattern: &str, reason: impl ToString) -> Self {
        CondenseError::Pattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
pub type Result<T, E = CondenseError> = std::result::Result<T, E>;
