//! Settings management for Redact.
//!
//! Provides TOML-based settings with XDG-compliant paths and environment
//! variable overrides. A missing settings file is not an error, and a
//! malformed one falls back to defaults through [`AppConfig::load_or_default`].

use crate::error::{ConfigError, ConfigResult};
use crate::types::{RedactionLevel, RedactionScope};
use directories::ProjectDirs;
use serde::de::{self, Deserializer, MapAccess};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// User-defined patterns, name to regular expression, in the order they
/// were added.
///
/// Stored as the `[custom_patterns]` table; entries keep their file order
/// through a load and save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomPatterns(Vec<(String, String)>);

impl CustomPatterns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `expression`. A replaced entry keeps its position.
    pub fn insert(&mut self, name: String, expression: String) -> Option<String> {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, expression)),
            None => {
                self.0.push((name, expression));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(index).1)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&String> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(n, _)| n)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, String)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a CustomPatterns {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, String)> for CustomPatterns {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut patterns = Self::new();
        for (name, expression) in iter {
            patterns.insert(name, expression);
        }
        patterns
    }
}

impl Serialize for CustomPatterns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(n, e)| (n, e)))
    }
}

impl<'de> Deserialize<'de> for CustomPatterns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedTable;

        impl<'de> de::Visitor<'de> for OrderedTable {
            type Value = CustomPatterns;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of pattern names to regular expressions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut patterns = CustomPatterns::new();
                while let Some((name, expression)) = map.next_entry::<String, String>()? {
                    patterns.insert(name, expression);
                }
                Ok(patterns)
            }
        }

        deserializer.deserialize_map(OrderedTable)
    }
}

/// Main settings record.
///
/// Loaded from `~/.config/redact/config.toml` (or platform equivalent) unless
/// an explicit path is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Redaction level used when none is given on the command line
    pub redaction_level: RedactionLevel,
    /// Directory of the most recently processed input
    pub last_directory: String,
    /// UI theme name; stored for front ends, not interpreted here
    pub theme: String,
    /// User-defined patterns, applied in file order
    pub custom_patterns: CustomPatterns,
    /// Engine behavior
    pub engine: EngineConfig,
    /// OCR and rasterization tools
    pub ocr: OcrConfig,
    /// Entity recognizer backend
    pub recognizer: RecognizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redaction_level: RedactionLevel::Basic,
            last_directory: String::new(),
            theme: "arc".to_string(),
            custom_patterns: CustomPatterns::new(),
            engine: EngineConfig::default(),
            ocr: OcrConfig::default(),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load settings from `path`, recovering from any error with defaults.
    ///
    /// A malformed settings file is never fatal; the problem is logged and
    /// the default configuration is returned.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `REDACT_LEVEL`: Override the default redaction level (1-3)
    /// - `REDACT_TESSERACT_CMD`: Override the tesseract executable
    /// - `REDACT_PDFTOPPM_CMD`: Override the pdftoppm executable
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("REDACT_LEVEL") {
            match val.parse::<RedactionLevel>() {
                Ok(level) => {
                    self.redaction_level = level;
                    tracing::debug!("Override redaction_level from env: {}", level.as_u8());
                }
                Err(e) => tracing::warn!("Ignoring REDACT_LEVEL: {}", e),
            }
        }

        if let Ok(val) = std::env::var("REDACT_TESSERACT_CMD") {
            tracing::debug!("Override ocr.tesseract_cmd from env: {}", val);
            self.ocr.tesseract_cmd = val;
        }

        if let Ok(val) = std::env::var("REDACT_PDFTOPPM_CMD") {
            tracing::debug!("Override ocr.pdftoppm_cmd from env: {}", val);
            self.ocr.pdftoppm_cmd = val;
        }

        self
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save settings to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        if !config_dir.as_os_str().is_empty() {
            fs::create_dir_all(config_dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        crate::fs::write_atomic(path, contents.as_bytes())?;
        Ok(())
    }

    /// Remember the directory of the last processed input.
    pub fn remember_directory(&mut self, input: &Path) {
        if let Some(parent) = input.parent() {
            self.last_directory = parent.display().to_string();
        }
    }

    /// Get the path to the settings file.
    ///
    /// Uses XDG base directories: `~/.config/redact/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "redact", "redact").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Engine behavior settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether units are recognized independently or as one document
    pub scope: RedactionScope,
}

/// OCR and PDF rasterization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable
    pub tesseract_cmd: String,
    /// Tesseract language code (e.g. `eng`); tesseract's default when empty
    pub language: String,
    /// Poppler `pdftoppm` executable
    pub pdftoppm_cmd: String,
    /// Rasterization resolution for PDF pages
    pub pdf_dpi: u32,
    /// Image tokens at or below this confidence are never redacted
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: String::new(),
            pdftoppm_cmd: "pdftoppm".to_string(),
            pdf_dpi: 200,
            min_confidence: 60.0,
        }
    }
}

/// Which entity recognizer backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    /// Dictionary of known terms per label
    #[default]
    Gazetteer,
    /// Remote NER service speaking JSON over HTTP
    Http,
}

/// Entity recognizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Backend selection
    pub kind: RecognizerKind,
    /// NER service endpoint for the `http` backend
    pub endpoint: String,
    /// Request timeout for the `http` backend
    pub timeout_secs: u64,
    /// Known terms per label for the `gazetteer` backend
    pub gazetteer: BTreeMap<String, Vec<String>>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            kind: RecognizerKind::Gazetteer,
            endpoint: "http://127.0.0.1:8080/ner".to_string(),
            timeout_secs: 30,
            gazetteer: BTreeMap::new(),
        }
    }
}
