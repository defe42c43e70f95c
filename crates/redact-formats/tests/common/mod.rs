//! Shared fixtures for format adapter tests.

#![allow(dead_code)]

use image::DynamicImage;
use redact_core::{Detection, OcrToken, RedactError, Result};
use redact_engine::{RedactionContext, StaticRecognizer};
use redact_formats::{AdapterOptions, AdapterRegistry, OcrEngine, PdfRasterizer};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// OCR double: fixed words for images, file contents as page text.
#[derive(Default)]
pub struct FakeOcr {
    pub words: Vec<OcrToken>,
}

impl OcrEngine for FakeOcr {
    fn recognize_words(&self, _image: &DynamicImage) -> Result<Vec<OcrToken>> {
        Ok(self.words.clone())
    }

    fn recognize_text(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| RedactError::Ocr(e.to_string()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Rasterizer double: writes each configured page text as a "page image".
#[derive(Default)]
pub struct FakeRasterizer {
    pub pages: Vec<String>,
}

impl PdfRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &Path, workdir: &Path) -> Result<Vec<PathBuf>> {
        self.pages
            .iter()
            .enumerate()
            .map(|(i, text)| -> Result<PathBuf> {
                let path = workdir.join(format!("page-{}.png", i + 1));
                std::fs::write(&path, text)?;
                Ok(path)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Context whose recognizer knows a handful of entities.
pub fn context() -> RedactionContext {
    RedactionContext::new(Arc::new(StaticRecognizer::new(vec![
        Detection::new("Jane Doe", "PERSON"),
        Detection::new("Jane", "PERSON"),
        Detection::new("Initech", "ORG"),
        Detection::new("Austin", "GPE"),
        Detection::new("Tuesday", "DATE"),
    ])))
}

pub fn registry_with(ocr: FakeOcr, rasterizer: FakeRasterizer) -> AdapterRegistry {
    AdapterRegistry::new(
        context(),
        Arc::new(ocr),
        Arc::new(rasterizer),
        AdapterOptions::default(),
    )
}

pub fn registry() -> AdapterRegistry {
    registry_with(FakeOcr::default(), FakeRasterizer::default())
}

/// Write a ZIP archive with the given text entries.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(contents.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

/// Read one entry of a ZIP archive as text.
pub fn read_zip_entry(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).expect("open zip");
    let mut archive = zip::ZipArchive::new(file).expect("read zip");
    let mut entry = archive.by_name(name).expect("entry exists");
    let mut contents = String::new();
    entry.read_to_string(&mut contents).expect("read entry");
    contents
}

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;

pub fn docx_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    )
}

pub fn write_docx(path: &Path, body: &str) {
    let document = docx_document(body);
    write_zip(
        path,
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/document.xml", &document),
            ("word/styles.xml", "<w:styles>Jane Doe style</w:styles>"),
        ],
    );
}
