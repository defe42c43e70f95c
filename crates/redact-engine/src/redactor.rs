//! Text redaction: entity substitution followed by pattern substitution.

use crate::patterns::PatternSet;
use crate::policy::RedactionPolicy;
use crate::recognizer::EntityRecognizer;
use redact_core::{Detection, RedactionLevel, RedactionScope, Result};
use std::sync::Arc;

/// Replacement written for every redacted span.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Applies a redaction level to plain text.
///
/// Every format adapter reduces its content to text units and delegates here,
/// so the same level produces the same substitutions in every format.
#[derive(Clone)]
pub struct TextRedactor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl TextRedactor {
    /// Create a redactor using `recognizer` for entity detection.
    #[must_use]
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// The entity recognizer.
    #[must_use]
    pub fn recognizer(&self) -> &Arc<dyn EntityRecognizer> {
        &self.recognizer
    }

    /// Run the recognizer over `text`.
    ///
    /// Empty text is never sent to the recognizer.
    pub fn detect(&self, text: &str) -> Result<Vec<Detection>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.recognizer.recognize(text)
    }

    /// Redact `text` at `level`.
    ///
    /// The recognizer runs once over the original text. Each selected
    /// detection is replaced everywhere it occurs, then the patterns run over
    /// the result when the level enables them.
    ///
    /// # Errors
    /// Returns `RedactError::Recognizer` if entity detection fails.
    pub fn redact(
        &self,
        text: &str,
        level: RedactionLevel,
        patterns: &PatternSet,
    ) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let detections = self.detect(text)?;
        tracing::trace!(
            recognizer = self.recognizer.name(),
            detections = detections.len(),
            "entities detected"
        );

        Ok(apply_detections(text, &detections, level, patterns))
    }

    /// Redact a sequence of text units at `level`.
    ///
    /// With [`RedactionScope::PerUnit`] each unit is recognized on its own.
    /// With [`RedactionScope::WholeDocument`] the recognizer sees all units
    /// joined by newlines once, and its detections are applied to every unit.
    /// The output always has one entry per input unit.
    pub fn redact_units(
        &self,
        units: &[String],
        level: RedactionLevel,
        patterns: &PatternSet,
        scope: RedactionScope,
    ) -> Result<Vec<String>> {
        match scope {
            RedactionScope::PerUnit => units
                .iter()
                .map(|unit| self.redact(unit, level, patterns))
                .collect(),
            RedactionScope::WholeDocument => {
                let detections = self.detect(&units.join("\n"))?;
                Ok(units
                    .iter()
                    .map(|unit| apply_detections(unit, &detections, level, patterns))
                    .collect())
            }
        }
    }
}

impl std::fmt::Debug for TextRedactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRedactor")
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

/// Substitute `detections` and, when the level enables them, `patterns`.
///
/// Detections whose label the level does not select are ignored, as are
/// detections with empty text. Replacement is a global literal substitution,
/// so every occurrence of a detected string is removed, including ones the
/// recognizer did not itself flag.
#[must_use]
pub fn apply_detections(
    text: &str,
    detections: &[Detection],
    level: RedactionLevel,
    patterns: &PatternSet,
) -> String {
    if text.is_empty() {
        return String::new();
    }

    let policy = RedactionPolicy::from_level(level);
    let mut result = text.to_string();

    for detection in detections {
        if detection.text.is_empty() || !policy.labels.contains(&detection.label) {
            continue;
        }
        if result.contains(&detection.text) {
            result = result.replace(&detection.text, REDACTION_MARKER);
        }
    }

    if policy.apply_patterns {
        result = patterns.replace_all(&result, REDACTION_MARKER);
    }

    result
}
