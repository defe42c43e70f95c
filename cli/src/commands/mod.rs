//! Command handlers.
//!
//! Handlers return the text to print so they can be tested without
//! capturing stdout.

pub mod batch;
pub mod config;
pub mod file;
pub mod patterns;
pub mod preview;

use crate::cli::Commands;
use crate::error::CommandError;
use crate::service::RedactionService;
use redact_core::RedactionLevel;

/// Run `command` and return its report.
pub async fn dispatch(
    service: &RedactionService,
    command: Commands,
) -> Result<String, CommandError> {
    match command {
        Commands::File {
            input,
            output,
            level,
            ..
        } => file::handle(service, input, output, resolve_level(service, level)).await,
        Commands::Batch { dir, level } => {
            batch::handle(service, dir, resolve_level(service, level)).await
        }
        Commands::Preview { input, level } => {
            preview::handle(service, input, resolve_level(service, level)).await
        }
        Commands::Patterns(cmd) => patterns::handle(service, cmd),
        Commands::Config(cmd) => config::handle(service.state(), cmd),
    }
}

/// Level from the command line, else from settings.
fn resolve_level(service: &RedactionService, level: Option<RedactionLevel>) -> RedactionLevel {
    level.unwrap_or_else(|| service.state().config().redaction_level)
}
