//! Shared types used across the Redact workspace.

use crate::error::RedactError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sensitivity level of a redaction operation.
///
/// Serialized as its integer value (`1`, `2` or `3`) so settings files keep
/// the plain `redaction_level = 2` form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum RedactionLevel {
    /// Names only
    #[default]
    Basic = 1,
    /// Names, organizations, locations and pattern matches
    Intermediate = 2,
    /// Every detected entity and pattern match
    Advanced = 3,
}

impl RedactionLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Intermediate, Self::Advanced];

    /// Integer value of the level.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short name of the level.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Human-readable summary of what the level removes.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Basic => "Names",
            Self::Intermediate => "Names, Emails, Locations",
            Self::Advanced => "All Identifiers",
        }
    }
}

impl TryFrom<u8> for RedactionLevel {
    type Error = RedactError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            other => Err(RedactError::Validation(format!(
                "redaction level must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<RedactionLevel> for u8 {
    fn from(level: RedactionLevel) -> Self {
        level.as_u8()
    }
}

impl FromStr for RedactionLevel {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return Self::try_from(value);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RedactError::Validation(format!("unknown redaction level '{trimmed}'")))
    }
}

impl fmt::Display for RedactionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}: {}", self.as_u8(), self.name())
    }
}

/// How much text the entity recognizer sees at once.
///
/// With `PerUnit` each paragraph, cell or page is recognized on its own, so
/// an entity split across a unit boundary is not detected. With
/// `WholeDocument` the recognizer runs once over all units and its detections
/// are applied to every unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedactionScope {
    /// Recognize every unit independently
    #[default]
    PerUnit,
    /// Recognize the concatenated document once
    WholeDocument,
}

impl RedactionScope {
    /// Kebab-case name used in settings and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerUnit => "per-unit",
            Self::WholeDocument => "whole-document",
        }
    }
}

impl FromStr for RedactionScope {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-unit" | "unit" => Ok(Self::PerUnit),
            "whole-document" | "document" => Ok(Self::WholeDocument),
            other => Err(RedactError::Validation(format!(
                "unknown redaction scope '{other}'"
            ))),
        }
    }
}

impl fmt::Display for RedactionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entity reported by the entity recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Exact span text
    pub text: String,
    /// Recognizer label (`PERSON`, `ORG`, `GPE`, ...)
    pub label: String,
    /// Byte offset of the span start, when the recognizer reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Byte offset of the span end, when the recognizer reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Detection {
    /// Create a detection without offsets.
    #[must_use]
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            start: None,
            end: None,
        }
    }

    /// Attach byte offsets.
    #[must_use]
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl BoundingBox {
    /// Create a bounding box.
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Scale every coordinate by `factor`.
    #[must_use]
    pub fn scaled(self, factor: u32) -> Self {
        Self {
            x: self.x.saturating_mul(factor),
            y: self.y.saturating_mul(factor),
            width: self.width.saturating_mul(factor),
            height: self.height.saturating_mul(factor),
        }
    }
}

/// A word recognized by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Recognized word
    pub text: String,
    /// Confidence, 0 to 100
    pub confidence: f32,
    /// Location of the word in the OCR input image
    pub bounding_box: BoundingBox,
}

impl OcrToken {
    /// Create a token.
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            confidence,
            bounding_box,
        }
    }
}
