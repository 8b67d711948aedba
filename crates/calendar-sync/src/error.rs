use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole job.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("service account credentials not found at {}", .0.display())]
    MissingCredentials(PathBuf),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("calendar '{name}' ({id}) not found; visible calendars: {visible}")]
    CalendarNotFound {
        id: String,
        name: String,
        visible: String,
    },

    #[error("source unavailable: {0}")]
    Source(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// A single calendar API call that failed.
#[derive(Debug, Error)]
#[error("{operation} failed for {target}: {message}")]
pub struct CalendarError {
    pub operation: &'static str,
    pub target: String,
    pub message: String,
}

impl CalendarError {
    pub fn new(
        operation: &'static str,
        target: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self {
            operation,
            target: target.into(),
            message: err.to_string(),
        }
    }
}
