use anyhow::{Context, Result};
use clap::Parser;
use redact_cli::cli::Cli;
use redact_cli::commands;
use redact_cli::service::RedactionService;
use redact_cli::state::AppState;
use redact_core::AppConfig;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = redact_cli::init_tracing(cli.log_file.as_deref()) {
        eprintln!("error: failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    info!("Starting Redact v{}", env!("CARGO_PKG_VERSION"));

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::config_path().context("locating settings file")?,
    };

    let mut config = AppConfig::load_or_default(&config_path).with_env_overrides();
    if let Some(scope) = cli.scope_override() {
        config.engine.scope = scope;
    }

    let state = AppState::from_config(config_path, config).context("building redaction engine")?;
    let service = RedactionService::new(Arc::new(state));

    Ok(commands::dispatch(&service, cli.command).await?)
}
