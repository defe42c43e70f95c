use crate::docx::DocxAdapter;
use crate::ocr::OcrEngine;
use crate::pdf::{PdfAdapter, PdfRasterizer};
use crate::raster::ImageAdapter;
use crate::text::TextAdapter;
use crate::xlsx::XlsxAdapter;
use redact_core::{RedactError, RedactionLevel, RedactionScope, Result};
use redact_engine::RedactionContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Extensions picked up by batch processing.
///
/// Single-file mode also accepts the remaining image extensions.
pub const BATCH_EXTENSIONS: &[&str] = &["txt", "docx", "xlsx", "pdf", "jpg", "jpeg", "png"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif"];

/// File formats with an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Plain UTF-8 text
    Text,
    /// Word document
    Docx,
    /// Excel workbook
    Xlsx,
    /// PDF, processed through OCR
    Pdf,
    /// Raster image, processed through OCR
    Image,
}

impl DocumentKind {
    /// Detect the kind from the file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            e if IMAGE_EXTENSIONS.contains(&e) => Some(Self::Image),
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Whether batch processing picks up `path`.
#[must_use]
pub fn is_batch_candidate(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| BATCH_EXTENSIONS.contains(&ext.as_str()))
}

/// Counts reported by an adapter after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOutcome {
    /// Text units examined (paragraphs, cells, pages, OCR words)
    pub units_processed: usize,
    /// Units whose content changed
    pub units_redacted: usize,
}

/// Coarse progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A PDF page finished OCR
    Page {
        /// 1-based page number
        page: usize,
        /// Total pages
        total: usize,
    },
    /// A batch is about to process a file
    File {
        /// 1-based position in the batch
        index: usize,
        /// Files in the batch
        total: usize,
        /// File about to be processed
        path: PathBuf,
    },
}

/// Receiver for progress events; called from the worker thread.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Adapter tuning shared by all formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdapterOptions {
    /// Recognition scope for multi-unit formats
    pub scope: RedactionScope,
    /// OCR words at or below this confidence are left alone
    pub min_confidence: f32,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            scope: RedactionScope::PerUnit,
            min_confidence: 60.0,
        }
    }
}

/// Redacts one file format.
pub trait FormatAdapter: Send + Sync {
    /// Format handled by this adapter.
    fn kind(&self) -> DocumentKind;

    /// Read `input`, redact it at `level` and write the result to `output`.
    ///
    /// On error nothing is left at `output`.
    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome>;
}

/// Maps files to adapters by extension.
pub struct AdapterRegistry {
    context: RedactionContext,
    text: TextAdapter,
    docx: DocxAdapter,
    xlsx: XlsxAdapter,
    pdf: PdfAdapter,
    image: ImageAdapter,
}

impl AdapterRegistry {
    /// Create adapters for every supported format.
    #[must_use]
    pub fn new(
        context: RedactionContext,
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PdfRasterizer>,
        options: AdapterOptions,
    ) -> Self {
        Self {
            text: TextAdapter::new(context.clone()),
            docx: DocxAdapter::new(context.clone(), options.scope),
            xlsx: XlsxAdapter::new(context.clone(), options.scope),
            pdf: PdfAdapter::new(context.clone(), Arc::clone(&ocr), rasterizer, options.scope),
            image: ImageAdapter::new(context.clone(), ocr, options.min_confidence),
            context,
        }
    }

    /// Report PDF page progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.pdf = self.pdf.with_progress(callback);
        self
    }

    /// Shared redaction context.
    #[must_use]
    pub fn context(&self) -> &RedactionContext {
        &self.context
    }

    /// Adapter for `path`, chosen by extension.
    ///
    /// # Errors
    /// Returns `RedactError::UnsupportedFormat` for unknown extensions.
    pub fn adapter_for(&self, path: &Path) -> Result<&dyn FormatAdapter> {
        let kind = DocumentKind::from_path(path).ok_or_else(|| RedactError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let adapter: &dyn FormatAdapter = match kind {
            DocumentKind::Text => &self.text,
            DocumentKind::Docx => &self.docx,
            DocumentKind::Xlsx => &self.xlsx,
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Image => &self.image,
        };
        Ok(adapter)
    }

    /// Redact `input` into `output` with the matching adapter.
    pub fn apply(
        &self,
        input: &Path,
        output: &Path,
        level: RedactionLevel,
    ) -> Result<AdapterOutcome> {
        if !input.is_file() {
            return Err(RedactError::NotFound {
                path: input.to_path_buf(),
            });
        }

        let adapter = self.adapter_for(input)?;
        let started = Instant::now();

        match adapter.apply(input, output, level) {
            Ok(outcome) => {
                tracing::info!(
                    input = %input.display(),
                    output = %output.display(),
                    format = adapter.kind().as_str(),
                    level = level.as_u8(),
                    units = outcome.units_processed,
                    redacted = outcome.units_redacted,
                    elapsed_ms = started.elapsed().as_millis(),
                    "file redacted"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    input = %input.display(),
                    format = adapter.kind().as_str(),
                    code = e.code(),
                    "redaction failed: {}",
                    e
                );
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry").finish_non_exhaustive()
    }
}
