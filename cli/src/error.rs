//! Error type for CLI commands.

use redact_core::{ConfigError, RedactError};
use serde::Serialize;
use std::fmt;

/// Error reported by a command.
#[derive(Debug, Serialize)]
pub struct CommandError {
    /// Error code (e.g., "FILE_NOT_FOUND")
    pub code: String,
    /// User-facing error message
    pub message: String,
    /// Optional context such as the offending path
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// Error for a blocking task that panicked or was cancelled.
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self::new("TASK_JOIN_ERROR", format!("Task join error: {err}"))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for CommandError {}

/// Convert RedactError to CommandError, keeping the error code.
impl From<RedactError> for CommandError {
    fn from(err: RedactError) -> Self {
        let path = match &err {
            RedactError::NotFound { path }
            | RedactError::UnsupportedFormat { path }
            | RedactError::CorruptContainer { path, .. }
            | RedactError::UnsupportedEncoding { path, .. }
            | RedactError::UnidentifiedImage { path } => Some(path.display().to_string()),
            _ => None,
        };

        match path {
            Some(path) => Self::with_details(
                err.code(),
                err.to_string(),
                serde_json::json!({ "path": path }),
            ),
            None => Self::new(err.code(), err.to_string()),
        }
    }
}

/// Convert ConfigError to CommandError.
impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::new("CONFIG_ERROR", format!("Settings error: {err}"))
    }
}

/// Convert std::io::Error to CommandError.
impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::new("FILESYSTEM_ERROR", format!("Filesystem error: {err}"))
    }
}
