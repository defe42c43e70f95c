//! Redact Formats - file format adapters and batch dispatch.
//!
//! Each adapter reduces a file to text units (the whole file, paragraphs,
//! cells, OCR pages or OCR words), sends them through the engine's text
//! redactor and writes the result back in the same shape.
//!
//! ## Supported formats
//!
//! | Extension | Adapter | Output |
//! |-----------|---------|--------|
//! | `txt` | [`text::TextAdapter`] | UTF-8 text |
//! | `docx` | [`docx::DocxAdapter`] | Word document, runs rewritten |
//! | `xlsx` | [`xlsx::XlsxAdapter`] | Workbook, text cells rewritten |
//! | `pdf` | [`pdf::PdfAdapter`] | UTF-8 transcript of OCR'd pages |
//! | `jpg jpeg png bmp gif tiff tif` | [`raster::ImageAdapter`] | Image with black boxes |
//!
//! Outputs are written to a temporary file next to the destination and moved
//! into place only on success.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Adapter trait, options and the extension registry.
pub mod adapter;
/// Directory-wide redaction.
pub mod batch;
/// Word documents.
pub mod docx;
/// OCR engine seam and the tesseract backend.
pub mod ocr;
mod ooxml;
/// PDF rasterization and transcript output.
pub mod pdf;
/// Redacted previews without writing output.
pub mod preview;
/// Raster images.
pub mod raster;
/// Plain text.
pub mod text;
/// Excel workbooks.
pub mod xlsx;

pub use adapter::{
    AdapterOptions, AdapterOutcome, AdapterRegistry, DocumentKind, FormatAdapter,
    ProgressCallback, ProgressEvent, BATCH_EXTENSIONS,
};
pub use batch::{BatchDispatcher, BatchReport, FileFailure, ProcessedFile, OUTPUT_DIR_NAME};
pub use ocr::{OcrEngine, TesseractOcr};
pub use pdf::{PdfRasterizer, PdftoppmRasterizer};
pub use preview::preview;
