//! Application state built from settings.

use crate::error::CommandError;
use redact_core::{AppConfig, RecognizerConfig, RecognizerKind, Result};
use redact_engine::{
    EntityRecognizer, GazetteerRecognizer, HttpRecognizer, PatternLibrary, RedactionContext,
};
use redact_formats::{
    AdapterOptions, AdapterRegistry, OcrEngine, PdfRasterizer, PdftoppmRasterizer, ProgressCallback,
    ProgressEvent, TesseractOcr,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything a command needs: settings, the redaction context and the
/// adapters wired to their collaborators.
pub struct AppState {
    /// Where settings are persisted
    pub config_path: PathBuf,

    /// Current settings; changes are written back with [`AppState::update_config`]
    pub config: Mutex<AppConfig>,

    /// Shared pattern library, history and recognizer
    pub context: RedactionContext,

    /// Adapters for every supported format
    pub registry: Arc<AdapterRegistry>,
}

impl AppState {
    /// Build state from settings with the configured recognizer,
    /// `tesseract` and `pdftoppm`.
    pub fn from_config(config_path: PathBuf, config: AppConfig) -> Result<Self> {
        let recognizer = build_recognizer(&config.recognizer)?;
        let ocr = TesseractOcr::new(config.ocr.tesseract_cmd.clone())
            .with_language(config.ocr.language.clone());
        let rasterizer =
            PdftoppmRasterizer::new(config.ocr.pdftoppm_cmd.clone(), config.ocr.pdf_dpi);

        Ok(Self::with_collaborators(
            config_path,
            config,
            recognizer,
            Arc::new(ocr),
            Arc::new(rasterizer),
        ))
    }

    /// Build state around explicit collaborators.
    pub fn with_collaborators(
        config_path: PathBuf,
        config: AppConfig,
        recognizer: Arc<dyn EntityRecognizer>,
        ocr: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn PdfRasterizer>,
    ) -> Self {
        let patterns = PatternLibrary::from_custom(&config.custom_patterns);
        let context = RedactionContext::with_patterns(recognizer, patterns);

        let options = AdapterOptions {
            scope: config.engine.scope,
            min_confidence: config.ocr.min_confidence,
        };
        let registry = AdapterRegistry::new(context.clone(), ocr, rasterizer, options)
            .with_progress(page_progress());

        Self {
            config_path,
            config: Mutex::new(config),
            context,
            registry: Arc::new(registry),
        }
    }

    /// Snapshot of the current settings.
    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Modify the settings and write them back to disk.
    ///
    /// The update is applied to the file as stored, so environment and
    /// command-line overrides in effect for this run are not persisted.
    pub fn update_config<F>(&self, update: F) -> std::result::Result<(), CommandError>
    where
        F: Fn(&mut AppConfig),
    {
        let mut config = self.config.lock().expect("config lock poisoned");

        let mut stored = AppConfig::load_or_default(&self.config_path);
        update(&mut stored);
        stored.save_to(&self.config_path)?;

        update(&mut config);
        Ok(())
    }
}

fn build_recognizer(config: &RecognizerConfig) -> Result<Arc<dyn EntityRecognizer>> {
    match config.kind {
        RecognizerKind::Gazetteer => {
            let recognizer = GazetteerRecognizer::new(&config.gazetteer)?;
            if recognizer.is_empty() {
                tracing::warn!("Gazetteer is empty; only pattern redaction will find anything");
            }
            Ok(Arc::new(recognizer))
        }
        RecognizerKind::Http => {
            tracing::info!("Using NER service at {}", config.endpoint);
            Ok(Arc::new(HttpRecognizer::new(
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            )))
        }
    }
}

fn page_progress() -> ProgressCallback {
    Arc::new(|event: &ProgressEvent| {
        if let ProgressEvent::Page { page, total } = event {
            tracing::debug!(page, total, "page recognized");
        }
    })
}
