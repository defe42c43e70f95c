//! Integration tests for CLI commands
//!
//! Commands run against a service whose recognizer knows a fixed set of
//! entities, with settings stored in a temporary directory.

use redact_cli::cli::{Commands, ConfigCommands, PatternCommands};
use redact_cli::commands::dispatch;
use redact_cli::service::RedactionService;
use redact_cli::state::AppState;
use redact_core::{AppConfig, Detection, RedactionLevel};
use redact_engine::StaticRecognizer;
use redact_formats::{PdftoppmRasterizer, TesseractOcr};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a service with settings at `<temp>/config/config.toml`.
fn create_test_service(temp_dir: &TempDir, config: AppConfig) -> RedactionService {
    let recognizer = StaticRecognizer::new(vec![
        Detection::new("Jane Doe", "PERSON"),
        Detection::new("Initech", "ORG"),
    ]);
    let state = AppState::with_collaborators(
        temp_dir.path().join("config").join("config.toml"),
        config,
        Arc::new(recognizer),
        Arc::new(TesseractOcr::default()),
        Arc::new(PdftoppmRasterizer::default()),
    );
    RedactionService::new(Arc::new(state))
}

fn stored_config(temp_dir: &TempDir) -> AppConfig {
    AppConfig::load_from(&temp_dir.path().join("config").join("config.toml")).expect("load config")
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("write input");
}

#[tokio::test]
async fn test_file_command_records_history() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());
    let input = temp_dir.path().join("memo.txt");
    let output = temp_dir.path().join("memo_redacted.txt");
    write(&input, "Jane Doe joined Initech. Mail jane@example.com");

    let report = dispatch(
        &service,
        Commands::File {
            input: input.clone(),
            output: output.clone(),
            level: Some(RedactionLevel::Intermediate),
            scope: None,
        },
    )
    .await
    .expect("redact file");

    assert_eq!(
        std::fs::read_to_string(&output).expect("read output"),
        "[REDACTED] joined [REDACTED]. Mail [REDACTED]"
    );
    assert!(report.contains("Last operation:"));
    assert!(report.contains("Level 2: Intermediate"));

    let history = service.state().context.history_entries();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].input_path, input);
    assert_eq!(history[0].output_path, output);

    assert_eq!(
        stored_config(&temp_dir).last_directory,
        temp_dir.path().display().to_string()
    );
}

#[tokio::test]
async fn test_file_command_uses_configured_level() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let mut config = AppConfig::default();
    config.redaction_level = RedactionLevel::Basic;
    let service = create_test_service(&temp_dir, config);
    let input = temp_dir.path().join("memo.txt");
    let output = temp_dir.path().join("out.txt");
    write(&input, "Jane Doe at Initech, 555-123-4567");

    dispatch(
        &service,
        Commands::File {
            input,
            output: output.clone(),
            level: None,
            scope: None,
        },
    )
    .await
    .expect("redact file");

    assert_eq!(
        std::fs::read_to_string(&output).expect("read output"),
        "[REDACTED] at Initech, 555-123-4567"
    );
}

#[tokio::test]
async fn test_failed_file_is_not_recorded() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());

    let err = dispatch(
        &service,
        Commands::File {
            input: temp_dir.path().join("absent.txt"),
            output: temp_dir.path().join("out.txt"),
            level: None,
            scope: None,
        },
    )
    .await
    .expect_err("missing input");

    assert_eq!(err.code, "FILE_NOT_FOUND");
    assert!(err.details.is_some());
    assert!(service.state().context.history_entries().is_empty());
}

#[tokio::test]
async fn test_batch_command_reports_failures() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());
    let docs = temp_dir.path().join("docs");
    std::fs::create_dir(&docs).expect("create docs dir");
    write(&docs.join("a.txt"), "Jane Doe");
    write(&docs.join("b.txt"), "Initech");
    std::fs::write(docs.join("c.txt"), [0xff, 0xfe, 0x00]).expect("write input");
    write(&docs.join("notes.md"), "Jane Doe");

    let report = dispatch(
        &service,
        Commands::Batch {
            dir: docs.clone(),
            level: Some(RedactionLevel::Basic),
        },
    )
    .await
    .expect("run batch");

    assert!(report.contains("2 of 3 files redacted"));
    assert!(report.contains("c.txt"));
    assert!(report.contains("Last operation:"));
    assert_eq!(
        std::fs::read_to_string(docs.join("redacted_files").join("redacted_a.txt"))
            .expect("read output"),
        "[REDACTED]"
    );
    assert_eq!(service.state().context.history_entries().len(), 2);
    assert_eq!(stored_config(&temp_dir).last_directory, docs.display().to_string());
}

#[tokio::test]
async fn test_preview_command() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());
    let note = temp_dir.path().join("note.txt");
    write(&note, "Ask Jane Doe");
    let scan = temp_dir.path().join("scan.png");
    write(&scan, "not really a png");

    let text = dispatch(
        &service,
        Commands::Preview {
            input: note.clone(),
            level: Some(RedactionLevel::Basic),
        },
    )
    .await
    .expect("preview text");
    assert_eq!(text, "Ask [REDACTED]\n");

    let unavailable = dispatch(
        &service,
        Commands::Preview {
            input: scan,
            level: None,
        },
    )
    .await
    .expect("preview image");
    assert!(unavailable.starts_with("Preview unavailable"));

    // Preview never writes or records anything
    assert!(service.state().context.history_entries().is_empty());
    assert_eq!(std::fs::read_to_string(&note).expect("read note"), "Ask Jane Doe");
}

#[tokio::test]
async fn test_pattern_commands_persist() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());

    let added = dispatch(
        &service,
        Commands::Patterns(PatternCommands::Add {
            name: "employee_id".to_string(),
            regex: r"EMP-\d{5}".to_string(),
        }),
    )
    .await
    .expect("add pattern");
    assert!(added.contains("employee_id"));
    assert_eq!(
        stored_config(&temp_dir).custom_patterns.get("employee_id"),
        Some(&r"EMP-\d{5}".to_string())
    );

    let listing = dispatch(&service, Commands::Patterns(PatternCommands::List))
        .await
        .expect("list patterns");
    assert!(listing.contains("emails"));
    assert!(listing.contains("[custom]"));

    let input = temp_dir.path().join("badge.txt");
    let output = temp_dir.path().join("badge_out.txt");
    write(&input, "Badge EMP-12345");
    service
        .redact_file(input, output.clone(), RedactionLevel::Advanced)
        .await
        .expect("redact file");
    assert_eq!(
        std::fs::read_to_string(&output).expect("read output"),
        "Badge [REDACTED]"
    );

    dispatch(
        &service,
        Commands::Patterns(PatternCommands::Remove {
            name: "employee_id".to_string(),
        }),
    )
    .await
    .expect("remove pattern");
    assert!(stored_config(&temp_dir).custom_patterns.is_empty());

    let err = dispatch(
        &service,
        Commands::Patterns(PatternCommands::Remove {
            name: "employee_id".to_string(),
        }),
    )
    .await
    .expect_err("already removed");
    assert_eq!(err.code, "PATTERN_NOT_FOUND");
}

#[tokio::test]
async fn test_pattern_order_survives_restart() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());

    for (name, regex) in [("zz_ticket", r"TCK-\d+"), ("aa_digits", r"\d+")] {
        dispatch(
            &service,
            Commands::Patterns(PatternCommands::Add {
                name: name.to_string(),
                regex: regex.to_string(),
            }),
        )
        .await
        .expect("add pattern");
    }

    let redacted = service
        .state()
        .context
        .redact_text("ref TCK-7", RedactionLevel::Intermediate)
        .expect("redact text");
    assert_eq!(redacted, "ref [REDACTED]");

    // A new process only sees what was saved
    let restarted = create_test_service(&temp_dir, stored_config(&temp_dir));
    let redacted = restarted
        .state()
        .context
        .redact_text("ref TCK-7", RedactionLevel::Intermediate)
        .expect("redact text");
    assert_eq!(redacted, "ref [REDACTED]");

    let listing = dispatch(&restarted, Commands::Patterns(PatternCommands::List))
        .await
        .expect("list patterns");
    let ticket = listing.find("zz_ticket").expect("ticket listed");
    let digits = listing.find("aa_digits").expect("digits listed");
    assert!(ticket < digits);
}

#[tokio::test]
async fn test_invalid_pattern_is_not_saved() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let service = create_test_service(&temp_dir, AppConfig::default());

    let err = dispatch(
        &service,
        Commands::Patterns(PatternCommands::Add {
            name: "broken".to_string(),
            regex: "([a-z".to_string(),
        }),
    )
    .await
    .expect_err("invalid regex");

    assert_eq!(err.code, "INVALID_PATTERN");
    assert!(service.state().context.custom_patterns().is_empty());
    assert!(!temp_dir.path().join("config").join("config.toml").exists());
}

#[tokio::test]
async fn test_config_commands() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let mut config = AppConfig::default();
    config.theme = "dark".to_string();
    let service = create_test_service(&temp_dir, config);

    let path = dispatch(&service, Commands::Config(ConfigCommands::Path))
        .await
        .expect("config path");
    assert!(path.trim_end().ends_with("config.toml"));

    let shown = dispatch(&service, Commands::Config(ConfigCommands::Show))
        .await
        .expect("config show");
    assert!(shown.contains("dark"));
    assert!(shown.contains("[ocr]"));
}
