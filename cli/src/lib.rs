//! Redact command-line shell
//!
//! This is the thin application shell that parses commands, builds the
//! collaborators from settings and prints results. Redaction logic lives in
//! the `crates/` directory.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod service;
pub mod state;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Initialize the tracing subscriber.
///
/// Log lines go to stderr, and are also appended to `log_file` when given.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,redact=debug"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init()?;
    Ok(())
}
