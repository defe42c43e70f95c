//! Explicit owner of the state shared by redaction operations.

use crate::history::{HistoryEntry, HistoryStack};
use crate::patterns::{PatternLibrary, PatternSet};
use crate::recognizer::EntityRecognizer;
use crate::redactor::TextRedactor;
use redact_core::{CustomPatterns, RedactionLevel, RedactionScope, Result};
use std::sync::{Arc, Mutex, RwLock};

/// Pattern library, history and text redactor for one session.
///
/// Cloning is cheap and every clone shares the same state. Pattern edits take
/// the write lock; redactions copy a [`PatternSet`] snapshot under the read
/// lock and run without holding it.
#[derive(Debug, Clone)]
pub struct RedactionContext {
    patterns: Arc<RwLock<PatternLibrary>>,
    history: Arc<Mutex<HistoryStack>>,
    redactor: Arc<TextRedactor>,
}

impl RedactionContext {
    /// Create a context with no custom patterns.
    #[must_use]
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self::with_patterns(recognizer, PatternLibrary::new())
    }

    /// Create a context with a preloaded pattern library.
    #[must_use]
    pub fn with_patterns(recognizer: Arc<dyn EntityRecognizer>, patterns: PatternLibrary) -> Self {
        Self {
            patterns: Arc::new(RwLock::new(patterns)),
            history: Arc::new(Mutex::new(HistoryStack::new())),
            redactor: Arc::new(TextRedactor::new(recognizer)),
        }
    }

    /// The text redactor.
    #[must_use]
    pub fn redactor(&self) -> &TextRedactor {
        &self.redactor
    }

    /// Snapshot of the effective patterns.
    #[must_use]
    pub fn pattern_snapshot(&self) -> PatternSet {
        self.patterns
            .read()
            .expect("patterns lock poisoned")
            .effective_patterns()
    }

    /// Validate and store a custom pattern.
    pub fn add_pattern(&self, name: &str, expression: &str) -> Result<()> {
        let mut patterns = self.patterns.write().expect("patterns lock poisoned");
        patterns.add_pattern(name, expression)?;
        tracing::info!(pattern = name, "custom pattern stored");
        Ok(())
    }

    /// Remove a custom pattern. Returns `true` if one was removed.
    pub fn remove_pattern(&self, name: &str) -> bool {
        let removed = self
            .patterns
            .write()
            .expect("patterns lock poisoned")
            .remove_pattern(name);
        if removed {
            tracing::info!(pattern = name, "custom pattern removed");
        }
        removed
    }

    /// Custom patterns, for persistence.
    #[must_use]
    pub fn custom_patterns(&self) -> CustomPatterns {
        self.patterns
            .read()
            .expect("patterns lock poisoned")
            .custom_patterns()
    }

    /// Record a completed operation.
    pub fn record(&self, entry: HistoryEntry) {
        tracing::debug!(id = %entry.id, "history entry recorded");
        self.history.lock().expect("history lock poisoned").push(entry);
    }

    /// Step history back; returns the new current entry.
    pub fn undo(&self) -> Option<HistoryEntry> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .undo()
            .cloned()
    }

    /// Step history forward; returns the new current entry.
    pub fn redo(&self) -> Option<HistoryEntry> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .redo()
            .cloned()
    }

    /// All history entries, oldest first.
    #[must_use]
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .entries()
            .to_vec()
    }

    /// Most recently recorded entry still in the history.
    #[must_use]
    pub fn last_entry(&self) -> Option<HistoryEntry> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .entries()
            .last()
            .cloned()
    }

    /// Redact `text` with the current patterns.
    pub fn redact_text(&self, text: &str, level: RedactionLevel) -> Result<String> {
        let patterns = self.pattern_snapshot();
        self.redactor.redact(text, level, &patterns)
    }

    /// Redact text units with the current patterns.
    pub fn redact_units(
        &self,
        units: &[String],
        level: RedactionLevel,
        scope: RedactionScope,
    ) -> Result<Vec<String>> {
        let patterns = self.pattern_snapshot();
        self.redactor.redact_units(units, level, &patterns, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::StaticRecognizer;
    use redact_core::Detection;
    use std::path::Path;

    fn context() -> RedactionContext {
        RedactionContext::new(Arc::new(StaticRecognizer::new(vec![Detection::new(
            "Ada Lovelace",
            "PERSON",
        )])))
    }

    #[test]
    fn test_clones_share_patterns() {
        let ctx = context();
        let other = ctx.clone();

        other.add_pattern("ticket", r"TCK-\d+").expect("add pattern");

        assert!(ctx.custom_patterns().contains_key("ticket"));
        assert_eq!(
            ctx.redact_text("see TCK-42", RedactionLevel::Intermediate)
                .expect("redact"),
            "see [REDACTED]"
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let ctx = context();
        let snapshot = ctx.pattern_snapshot();
        ctx.add_pattern("ticket", r"TCK-\d+").expect("add pattern");

        assert!(snapshot.get("ticket").is_none());
        assert!(ctx.pattern_snapshot().get("ticket").is_some());
    }

    #[test]
    fn test_invalid_pattern_leaves_context_unchanged() {
        let ctx = context();
        assert!(ctx.add_pattern("bad", "(").is_err());
        assert!(ctx.custom_patterns().is_empty());
        assert!(!ctx.remove_pattern("bad"));
    }

    #[test]
    fn test_history_through_context() {
        let ctx = context();
        for name in ["a", "b"] {
            let input = format!("{name}.txt");
            let output = format!("{name}_out.txt");
            ctx.record(HistoryEntry::new(
                Path::new(&input),
                Path::new(&output),
                RedactionLevel::Basic,
            ));
        }

        assert_eq!(ctx.history_entries().len(), 2);
        assert_eq!(
            ctx.undo().map(|e| e.input_path),
            Some(Path::new("a.txt").to_path_buf())
        );
        assert_eq!(
            ctx.redo().map(|e| e.input_path),
            Some(Path::new("b.txt").to_path_buf())
        );
        assert_eq!(
            ctx.last_entry().map(|e| e.output_path),
            Some(Path::new("b_out.txt").to_path_buf())
        );
    }
}
