//! Redaction operations on top of [`AppState`].
//!
//! File work runs on the blocking pool and at most one redaction runs at a
//! time. Every file written successfully is pushed onto the history.

use crate::error::CommandError;
use crate::state::AppState;
use redact_core::{AppConfig, RedactionLevel};
use redact_engine::HistoryEntry;
use redact_formats::{BatchDispatcher, BatchReport, ProgressCallback, ProgressEvent};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

type ServiceResult<T> = std::result::Result<T, CommandError>;

/// Runs redactions for the CLI.
pub struct RedactionService {
    state: Arc<AppState>,
    op_lock: tokio::sync::Mutex<()>,
    cancel: Arc<AtomicBool>,
}

impl RedactionService {
    /// Create a service over `state`.
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            op_lock: tokio::sync::Mutex::new(()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Flag that stops a running batch before its next file.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Redact `input` into `output`.
    pub async fn redact_file(
        &self,
        input: PathBuf,
        output: PathBuf,
        level: RedactionLevel,
    ) -> ServiceResult<HistoryEntry> {
        let _guard = self.op_lock.lock().await;

        let registry = Arc::clone(&self.state.registry);
        let (src, dst) = (input.clone(), output.clone());
        tokio::task::spawn_blocking(move || registry.apply(&src, &dst, level))
            .await
            .map_err(CommandError::join)??;

        let entry = HistoryEntry::new(&input, &output, level);
        self.state.context.record(entry.clone());
        self.save_last_directory(|config| config.remember_directory(&input));
        Ok(entry)
    }

    /// Redact every supported file in `dir`.
    pub async fn redact_directory(
        &self,
        dir: PathBuf,
        level: RedactionLevel,
    ) -> ServiceResult<BatchReport> {
        let _guard = self.op_lock.lock().await;
        self.cancel.store(false, Ordering::SeqCst);

        let registry = Arc::clone(&self.state.registry);
        let cancel = Arc::clone(&self.cancel);
        let batch_dir = dir.clone();
        let report = tokio::task::spawn_blocking(move || {
            BatchDispatcher::new(&registry)
                .with_progress(file_progress())
                .run(&batch_dir, level, &cancel)
        })
        .await
        .map_err(CommandError::join)??;

        for file in &report.succeeded {
            self.state
                .context
                .record(HistoryEntry::new(&file.input_path, &file.output_path, level));
        }
        self.save_last_directory(|config| config.last_directory = dir.display().to_string());
        Ok(report)
    }

    /// Redacted text of `input`, or `None` for formats without preview.
    pub async fn preview(
        &self,
        input: PathBuf,
        level: RedactionLevel,
    ) -> ServiceResult<Option<String>> {
        let _guard = self.op_lock.lock().await;

        let context = self.state.context.clone();
        let text =
            tokio::task::spawn_blocking(move || redact_formats::preview(&context, &input, level))
                .await
                .map_err(CommandError::join)??;
        Ok(text)
    }

    /// Add or replace a custom pattern and persist it.
    pub fn add_pattern(&self, name: &str, expression: &str) -> ServiceResult<()> {
        self.state.context.add_pattern(name, expression)?;
        self.persist_patterns()?;
        info!(pattern = name, "custom pattern saved");
        Ok(())
    }

    /// Remove a custom pattern. Returns `false` if none had that name.
    pub fn remove_pattern(&self, name: &str) -> ServiceResult<bool> {
        if !self.state.context.remove_pattern(name) {
            return Ok(false);
        }
        self.persist_patterns()?;
        info!(pattern = name, "custom pattern removed");
        Ok(true)
    }

    fn persist_patterns(&self) -> ServiceResult<()> {
        let patterns = self.state.context.custom_patterns();
        self.state
            .update_config(|config| config.custom_patterns.clone_from(&patterns))
    }

    fn save_last_directory<F: Fn(&mut AppConfig)>(&self, update: F) {
        if let Err(e) = self.state.update_config(update) {
            warn!("Failed to save last directory: {}", e);
        }
    }
}

fn file_progress() -> ProgressCallback {
    Arc::new(|event: &ProgressEvent| {
        if let ProgressEvent::File { index, total, path } = event {
            info!(index, total, file = %path.display(), "processing");
        }
    })
}
