use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LogError>;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("invalid match field {0:?}")]
    InvalidField(String),

    #[error("failed to seek to end: {0}")]
    Seek(String),

    #[error("failed to move back entries: {0}")]
    StepBack(String),

    #[error("failed to get entry: {0}")]
    Entry(String),

    #[error("no log entries matched unit {0}")]
    UnitNotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("log retrieval was cancelled")]
    Cancelled,

    #[error("log retrieval task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LogError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidField(_) => "invalid_request",
            Self::UnitNotFound(_) => "not_found",
            Self::Timeout(_) | Self::Cancelled => "timeout",
            Self::Task(_) => "internal",
            Self::Seek(_)
            | Self::StepBack(_)
            | Self::Entry(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => "transport",
        }
    }
}
