//! Directory-wide redaction.
//!
//! Every supported file directly inside a directory is redacted into
//! `<dir>/redacted_files/redacted_<name>`. A failing file is recorded and the
//! batch moves on; only problems with the directory itself abort the run.

use crate::adapter::{is_batch_candidate, AdapterRegistry, ProgressCallback, ProgressEvent};
use redact_core::{RedactError, RedactionLevel, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Name of the output directory created inside the input directory.
pub const OUTPUT_DIR_NAME: &str = "redacted_files";

const OUTPUT_PREFIX: &str = "redacted_";

/// A file the batch redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Source file
    pub input_path: PathBuf,
    /// Redacted output
    pub output_path: PathBuf,
}

/// A file the batch could not redact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Source file
    pub path: PathBuf,
    /// Error message
    pub reason: String,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Where outputs were written
    pub output_dir: PathBuf,
    /// Files redacted successfully, in processing order
    pub succeeded: Vec<ProcessedFile>,
    /// Files that failed, in processing order
    pub failed: Vec<FileFailure>,
    /// Files not started because the batch was cancelled
    pub skipped_cancelled: usize,
}

impl BatchReport {
    /// Number of candidate files found.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped_cancelled
    }
}

/// Runs the adapter registry over a directory.
pub struct BatchDispatcher<'a> {
    registry: &'a AdapterRegistry,
    progress: Option<ProgressCallback>,
}

impl<'a> BatchDispatcher<'a> {
    /// Create a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: &'a AdapterRegistry) -> Self {
        Self {
            registry,
            progress: None,
        }
    }

    /// Report each file before it is processed.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Redact every supported file directly inside `dir`.
    ///
    /// `cancel` is checked before each file; setting it lets the current file
    /// finish and skips the rest.
    ///
    /// # Errors
    /// Returns an error only if `dir` cannot be listed or the output
    /// directory cannot be created.
    pub fn run(
        &self,
        dir: &Path,
        level: RedactionLevel,
        cancel: &AtomicBool,
    ) -> Result<BatchReport> {
        let files = list_candidates(dir)?;
        let output_dir = dir.join(OUTPUT_DIR_NAME);
        fs::create_dir_all(&output_dir)?;

        info!(
            dir = %dir.display(),
            files = files.len(),
            level = level.as_u8(),
            "starting batch"
        );

        let total = files.len();
        let mut report = BatchReport {
            output_dir: output_dir.clone(),
            ..BatchReport::default()
        };

        for (i, input) in files.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                report.skipped_cancelled = total - i;
                warn!(remaining = report.skipped_cancelled, "batch cancelled");
                break;
            }

            if let Some(progress) = &self.progress {
                progress(&ProgressEvent::File {
                    index: i + 1,
                    total,
                    path: input.clone(),
                });
            }

            let output = output_dir.join(output_name(input));
            match self.registry.apply(input, &output, level) {
                Ok(_) => report.succeeded.push(ProcessedFile {
                    input_path: input.clone(),
                    output_path: output,
                }),
                Err(e) => report.failed.push(FileFailure {
                    path: input.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped_cancelled,
            "batch finished"
        );
        Ok(report)
    }
}

fn output_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{OUTPUT_PREFIX}{name}")
}

/// Regular files directly inside `dir` with a batch extension, sorted by name.
///
/// Symlinks and subdirectories are skipped.
pub fn list_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(RedactError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(RedactError::Validation(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Failed to read entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let is_file = entry.file_type().is_ok_and(|t| t.is_file());
        let path = entry.path();
        if is_file && is_batch_candidate(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Path::new("/in/Report.DOCX")), "redacted_Report.DOCX");
    }

    #[test]
    fn test_list_candidates_filters_and_sorts() {
        let tmp = TempDir::new().expect("create temp dir");
        for name in ["b.txt", "a.PDF", "c.bmp", "notes.md", "d.xlsx"] {
            fs::write(tmp.path().join(name), b"x").expect("write file");
        }
        fs::create_dir(tmp.path().join("sub.txt")).expect("create dir");

        let names: Vec<String> = list_candidates(tmp.path())
            .expect("list")
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.txt", "d.xlsx"]);
    }

    #[test]
    fn test_list_candidates_missing_dir() {
        let tmp = TempDir::new().expect("create temp dir");
        let err = list_candidates(&tmp.path().join("absent")).expect_err("missing dir");
        assert!(matches!(err, RedactError::NotFound { .. }));
    }
}
