use crate::error::CommandError;
use crate::service::RedactionService;
use redact_core::RedactionLevel;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

pub async fn handle(
    service: &RedactionService,
    dir: PathBuf,
    level: RedactionLevel,
) -> Result<String, CommandError> {
    // Ctrl-C lets the current file finish and skips the rest
    let cancel = service.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current file");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = service.redact_directory(dir, level).await;
    watcher.abort();
    let report = result?;

    let mut lines = vec![
        format!(
            "✓ Batch finished: {} of {} files redacted",
            report.succeeded.len(),
            report.total()
        ),
        format!("  Output directory: {}", report.output_dir.display()),
    ];

    if !report.failed.is_empty() {
        lines.push("  Failed:".to_string());
        for failure in &report.failed {
            lines.push(format!("    {}: {}", failure.path.display(), failure.reason));
        }
    }
    if report.skipped_cancelled > 0 {
        lines.push(format!("  Cancelled: {} files not processed", report.skipped_cancelled));
    }

    if let Some(entry) = service.state().context.last_entry() {
        lines.push(format!("  Last operation: {}", entry.description()));
    }
    Ok(lines.iter().map(|line| format!("{line}\n")).collect())
}
