//! Redact Core - Foundation crate for the Redact document redaction engine.
//!
//! This crate provides the shared types, error handling and settings
//! management that the engine, format adapters and CLI depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based settings with XDG paths
//! - [`types`] - Shared domain types (`RedactionLevel`, `Detection`, `OcrToken`)
//! - [`fs`] - Atomic output writes
//!
//! # Example
//!
//! ```rust
//! use redact_core::{AppConfig, RedactionLevel};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.redaction_level, RedactionLevel::Basic);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod fs;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, CustomPatterns, EngineConfig, OcrConfig, RecognizerConfig, RecognizerKind,
};
pub use error::{ConfigError, ConfigResult, RedactError, Result};
pub use types::{BoundingBox, Detection, OcrToken, RedactionLevel, RedactionScope};
