//! Core error types for the Redact engine.
//!
//! This module defines the central error type shared by the engine, the
//! format adapters and the CLI. Variants are grouped into input errors,
//! collaborator errors and configuration errors so callers can decide
//! whether a failure is specific to one file or fatal for the operation.

use std::path::PathBuf;
use thiserror::Error;

/// Central error type for all redaction operations.
#[derive(Error, Debug)]
pub enum RedactError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input file does not exist
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// No adapter handles this file type
    #[error("unsupported format: {}", path.display())]
    UnsupportedFormat {
        /// Offending file
        path: PathBuf,
    },

    /// Container could not be opened or is missing required parts
    #[error("corrupt container {}: {reason}", path.display())]
    CorruptContainer {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Text content is not valid UTF-8
    #[error("unsupported encoding in {}: {reason}", path.display())]
    UnsupportedEncoding {
        /// Offending file
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// A custom regular expression failed to compile
    #[error("invalid pattern '{name}': {reason}")]
    InvalidPattern {
        /// Pattern name
        name: String,
        /// Compiler message
        reason: String,
    },

    /// The file could not be decoded as an image
    #[error("{} is not a valid image format", path.display())]
    UnidentifiedImage {
        /// Offending file
        path: PathBuf,
    },

    /// Entity recognizer failed or returned an unexpected shape
    #[error("entity recognizer error: {0}")]
    Recognizer(String),

    /// OCR engine failed or returned an unexpected shape
    #[error("OCR error: {0}")]
    Ocr(String),

    /// PDF rasterization failed
    #[error("rasterizer error: {0}")]
    Rasterizer(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RedactError {
    /// Short machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotFound { .. } => "FILE_NOT_FOUND",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::CorruptContainer { .. } => "CORRUPT_CONTAINER",
            Self::UnsupportedEncoding { .. } => "UNSUPPORTED_ENCODING",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::UnidentifiedImage { .. } => "UNIDENTIFIED_IMAGE",
            Self::Recognizer(_) => "RECOGNIZER_ERROR",
            Self::Ocr(_) => "OCR_ERROR",
            Self::Rasterizer(_) => "RASTERIZER_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error was caused by an external collaborator
    /// (recognizer, OCR engine or rasterizer) rather than by the input.
    #[must_use]
    pub fn is_collaborator_error(&self) -> bool {
        matches!(self, Self::Recognizer(_) | Self::Ocr(_) | Self::Rasterizer(_))
    }
}

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `RedactError`.
pub type Result<T> = std::result::Result<T, RedactError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
