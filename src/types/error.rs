//! Error types for the ask service.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Model not loaded yet")]
    ModelNotReady,

    #[error("Could not generate valid SQL for this question")]
    NoSqlDerived,

    #[error("SQL execution error: {message}. Generated SQL: {sql}")]
    ExecutionError { sql: String, message: String },

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServiceError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ModelNotReady => 503,
            Self::NoSqlDerived => 400,
            Self::ExecutionError { .. } => 400,
            Self::LlmError(_) => 502,
            Self::ConfigError(_) => 500,
            Self::SqliteError(_) => 500,
            Self::JsonError(_) => 500,
            Self::IoError(_) => 500,
        }
    }
}
