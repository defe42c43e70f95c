//! PDF adapter.
//!
//! Pages are rasterized, OCR'd to text and redacted. The output is a UTF-8
//! transcript, not a PDF:
//!
//! ```text
//! Page 1
//! --------------------
//! <redacted page text>
//!
//! ```

use crate::adapter::{AdapterOutcome, DocumentKind, FormatAdapter, ProgressCallback, ProgressEvent};
use crate::ocr::OcrEngine;
use redact_core::fs::write_atomic;
use redact_core::{RedactError, RedactionLevel, RedactionScope, Result};
use redact_engine::RedactionContext;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

/// Renders PDF pages to image files.
pub trait PdfRasterizer: Send + Sync {
    /// Render every page of `pdf` into `workdir`, returning image paths in
    /// page order.
    fn rasterize(&self, pdf: &Path, workdir: &Path) -> Result<Vec<PathBuf>>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Rasterization through poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    command: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    /// Use the `pdftoppm` executable at `command`, rendering at `dpi`.
    #[must_use]
    pub fn new(command: impl Into<String>, dpi: u32) -> Self {
        Self {
            command: command.into(),
            dpi,
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm", 200)
    }
}

impl PdfRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, workdir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.command)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(workdir.join("page"))
            .output()
            .map_err(|e| RedactError::Rasterizer(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            return Err(RedactError::Rasterizer(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // pdftoppm zero-pads page numbers to the width of the page count
        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(workdir)?
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                let stem = path.file_stem()?.to_str()?;
                let number = stem.strip_prefix("page-")?.parse().ok()?;
                Some((number, path))
            })
            .collect();
        pages.sort_by_key(|(number, _)| *number);

        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }

    fn name(&self) -> &str {
        "pdftoppm"
    }
}

/// Redacts `.pdf` files into a text transcript.
pub struct PdfAdapter {
    context: RedactionContext,
    ocr: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PdfRasterizer>,
    scope: RedactionScope,
    progress: Option<ProgressCallback>,
}

impl PdfAdapter {
    /// Create the adapter.
    #[must_use]
    pub fn new(
        context: RedactionContext,
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PdfRasterizer>,
        scope: RedactionScope,
    ) -> Self {
        Self {
            context,
            ocr,
            rasterizer,
            scope,
            progress: None,
        }
    }

    /// Report each page as it finishes OCR.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }
}

fn check_signature(path: &Path) -> Result<()> {
    let mut magic = [0u8; 5];
    let read = File::open(path)?.read(&mut magic)?;
    if read < magic.len() || &magic != b"%PDF-" {
        return Err(RedactError::CorruptContainer {
            path: path.to_path_buf(),
            reason: "missing %PDF- header".to_string(),
        });
    }
    Ok(())
}

/// Format redacted page texts as a transcript.
#[must_use]
pub fn transcript(pages: &[String]) -> String {
    let rule = "-".repeat(20);
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| format!("Page {}\n{rule}\n{text}\n\n", i + 1))
        .collect()
}

impl FormatAdapter for PdfAdapter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome> {
        check_signature(input)?;

        let workdir = TempDir::new()?;
        let pages = self.rasterizer.rasterize(input, workdir.path())?;
        tracing::debug!(
            rasterizer = self.rasterizer.name(),
            pages = pages.len(),
            "rasterized {}",
            input.display()
        );

        let total = pages.len();
        let mut texts = Vec::with_capacity(total);
        for (i, page) in pages.iter().enumerate() {
            texts.push(self.ocr.recognize_text(page)?);
            if let Some(progress) = &self.progress {
                progress(&ProgressEvent::Page { page: i + 1, total });
            }
        }

        let redacted = self.context.redact_units(&texts, level, self.scope)?;
        let units_redacted = texts.iter().zip(&redacted).filter(|(a, b)| a != b).count();

        write_atomic(output, transcript(&redacted).as_bytes())?;
        Ok(AdapterOutcome {
            units_processed: total,
            units_redacted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_format() {
        let out = transcript(&["first".to_string(), "second".to_string()]);
        assert_eq!(
            out,
            "Page 1\n--------------------\nfirst\n\nPage 2\n--------------------\nsecond\n\n"
        );
        assert!(transcript(&[]).is_empty());
    }

    #[test]
    fn test_signature_check() {
        let tmp = TempDir::new().expect("create temp dir");
        let fake = tmp.path().join("fake.pdf");
        std::fs::write(&fake, b"not a pdf").expect("write file");
        assert!(matches!(
            check_signature(&fake),
            Err(RedactError::CorruptContainer { .. })
        ));

        let real = tmp.path().join("real.pdf");
        std::fs::write(&real, b"%PDF-1.7\n").expect("write file");
        assert!(check_signature(&real).is_ok());
    }
}
