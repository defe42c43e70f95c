//! Optical character recognition.

use image::DynamicImage;
use redact_core::{BoundingBox, OcrToken, RedactError, Result};
use std::path::Path;
use std::process::Command;

/// Turns images into text.
pub trait OcrEngine: Send + Sync {
    /// Recognize individual words with their confidence and location.
    ///
    /// Coordinates are in pixels of `image`.
    fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<OcrToken>>;

    /// Recognize the full text of the image file at `path`.
    fn recognize_text(&self, path: &Path) -> Result<String>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: Option<String>,
}

impl TesseractOcr {
    /// Use the tesseract executable at `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: None,
        }
    }

    /// Recognize `language` (tesseract code, e.g. `eng`) instead of the default.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = (!language.is_empty()).then_some(language);
        self
    }

    fn run(&self, image: &Path, tsv: bool) -> Result<String> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(image).arg("stdout");
        if let Some(lang) = &self.language {
            cmd.arg("-l").arg(lang);
        }
        if tsv {
            cmd.arg("tsv");
        }

        let output = cmd
            .output()
            .map_err(|e| RedactError::Ocr(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RedactError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_words(&self, image: &DynamicImage) -> Result<Vec<OcrToken>> {
        let tmp = tempfile::Builder::new()
            .prefix("redact-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(tmp.path(), image::ImageFormat::Png)
            .map_err(|e| RedactError::Ocr(format!("failed to stage image: {e}")))?;

        let tsv = self.run(tmp.path(), true)?;
        let tokens = parse_tsv(&tsv);
        tracing::trace!(words = tokens.len(), "tesseract words");
        Ok(tokens)
    }

    fn recognize_text(&self, path: &Path) -> Result<String> {
        self.run(path, false)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Parse tesseract TSV output into word tokens.
///
/// Only word rows (level 5) with a non-negative confidence and non-blank
/// text are kept.
pub fn parse_tsv(tsv: &str) -> Vec<OcrToken> {
    tsv.lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.splitn(12, '\t').collect();
            if cols.len() < 11 || cols[0].trim() != "5" {
                return None;
            }

            let confidence: f32 = cols[10].trim().parse().ok()?;
            let text = cols.get(11).map_or("", |t| t.trim());
            if confidence < 0.0 || text.is_empty() {
                return None;
            }

            let number = |i: usize| cols[i].trim().parse::<u32>().ok();
            let bbox = BoundingBox::new(number(6)?, number(7)?, number(8)?, number(9)?);
            Some(OcrToken::new(text, confidence, bbox))
        })
        .collect()
}
