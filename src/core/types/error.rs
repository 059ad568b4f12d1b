use thiserror::Error;

/// Failures while reading or interpreting an external report.
///
/// None of these abort an evaluation cycle: the `load_*` entry points log them and hand the
/// caller `None` instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected report structure: {0}")]
    FormatMismatch(String),
    #[error("Malformed JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Not a self-closing record: {0}")]
    Malformed(String),
    #[error("Unknown challenge tag: {0}")]
    UnknownTag(String),
    #[error("Missing attribute '{0}'")]
    MissingAttribute(&'static str),
    #[error("Invalid value for attribute '{attribute}': {value}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Challenge {0} not found")]
    NotFound(i64),
    #[error("Stored record is unreadable: {0}")]
    Record(#[from] RecordError),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Custom(String),
}

pub type AppResult<T> = Result<T, AppError>;
