//! Regular-expression detectors for pattern-based redaction.
//!
//! The built-in detectors are fixed and run over the unmodified text without
//! any locale-aware tokenization. They are deliberately simple and produce
//! false positives (the 8-12 digit account pattern matches many incidental
//! numbers) as well as false negatives.

use once_cell::sync::Lazy;
use redact_core::{CustomPatterns, RedactError, Result};
use regex::Regex;

/// A compiled, named regular expression.
#[derive(Clone)]
pub struct NamedPattern {
    name: String,
    regex: Regex,
}

impl NamedPattern {
    /// Compile `expression` under `name`.
    ///
    /// # Errors
    /// Returns `RedactError::InvalidPattern` if the name is empty or the
    /// expression does not compile.
    pub fn new(name: impl Into<String>, expression: &str) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RedactError::InvalidPattern {
                name,
                reason: "pattern name must not be empty".to_string(),
            });
        }

        let regex = Regex::new(expression).map_err(|e| RedactError::InvalidPattern {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { name, regex })
    }

    /// Pattern name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl std::fmt::Debug for NamedPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedPattern")
            .field("name", &self.name)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Built-in detector names and expressions, in application order.
pub const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    (
        "emails",
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
    ),
    ("phone_numbers", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"),
    ("ssn", r"\b\d{3}[-]?\d{2}[-]?\d{4}\b"),
    ("credit_cards", r"\b\d{4}[-]?\d{4}[-]?\d{4}[-]?\d{4}\b"),
    ("bank_accounts", r"\b\d{8,12}\b"),
    ("addresses", r"\b\d+\s+[A-Za-z\s,]+\b[A-Z]{2}\s+\d{5}\b"),
    ("dates", r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b"),
    ("ip_addresses", r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b"),
    ("urls", r"https?://(?:[-\w.]|(?:%[\da-fA-F]{2}))+[^\s]*"),
];

// Compiled once; the expressions above are fixed.
static BUILTINS: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
    BUILTIN_PATTERNS
        .iter()
        .map(|(name, expression)| {
            NamedPattern::new(*name, expression).expect("built-in pattern is valid")
        })
        .collect()
});

/// An immutable, ordered snapshot of patterns to apply.
///
/// Taken from a [`PatternLibrary`] before a redaction starts, so edits made
/// while a redaction is running never produce a partially merged set.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<NamedPattern>,
}

impl PatternSet {
    /// A set containing only the built-in detectors.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            patterns: BUILTINS.clone(),
        }
    }

    /// An empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterate patterns in application order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedPattern> {
        self.patterns.iter()
    }

    /// Pattern names in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(NamedPattern::name).collect()
    }

    /// Look up a pattern by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NamedPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Replace every match of every pattern, in order, with `marker`.
    ///
    /// Each pattern runs over the output of the previous one.
    #[must_use]
    pub fn replace_all(&self, text: &str, marker: &str) -> String {
        let mut result = text.to_string();
        for pattern in &self.patterns {
            if pattern.regex.is_match(&result) {
                result = pattern
                    .regex
                    .replace_all(&result, regex::NoExpand(marker))
                    .into_owned();
            }
        }
        result
    }

    /// Insert or overwrite by name. An overwrite keeps the original position.
    fn upsert(&mut self, pattern: NamedPattern) {
        if let Some(existing) = self.patterns.iter_mut().find(|p| p.name == pattern.name) {
            *existing = pattern;
        } else {
            self.patterns.push(pattern);
        }
    }
}

/// Built-in detectors plus user-defined named patterns.
///
/// Custom entries have map semantics: adding a name that already exists
/// replaces the earlier expression.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    custom: Vec<NamedPattern>,
}

impl PatternLibrary {
    /// Create a library with no custom patterns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from persisted custom patterns, keeping their order.
    ///
    /// Entries that fail to compile are skipped with a warning rather than
    /// failing startup.
    #[must_use]
    pub fn from_custom(custom: &CustomPatterns) -> Self {
        let mut library = Self::new();
        for (name, expression) in custom {
            if let Err(e) = library.add_pattern(name, expression) {
                tracing::warn!("Skipping stored pattern: {}", e);
            }
        }
        library
    }

    /// Validate and store a custom pattern.
    ///
    /// # Errors
    /// Returns `RedactError::InvalidPattern` if the expression does not
    /// compile; the library is left unchanged.
    pub fn add_pattern(&mut self, name: &str, expression: &str) -> Result<()> {
        let pattern = NamedPattern::new(name, expression)?;

        if let Some(existing) = self.custom.iter_mut().find(|p| p.name == name) {
            tracing::debug!(pattern = name, "replacing custom pattern");
            *existing = pattern;
        } else {
            tracing::debug!(pattern = name, "adding custom pattern");
            self.custom.push(pattern);
        }
        Ok(())
    }

    /// Remove a custom pattern. Built-ins cannot be removed.
    ///
    /// Returns `true` if a pattern was removed.
    pub fn remove_pattern(&mut self, name: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|p| p.name != name);
        before != self.custom.len()
    }

    /// Custom patterns in insertion order, for persistence.
    #[must_use]
    pub fn custom_patterns(&self) -> CustomPatterns {
        self.custom
            .iter()
            .map(|p| (p.name.clone(), p.as_str().to_string()))
            .collect()
    }

    /// Number of custom patterns.
    #[must_use]
    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }

    /// Built-ins merged with custom entries.
    ///
    /// Built-ins come first in their fixed order. A custom entry named like a
    /// built-in replaces it in place; the remaining custom entries follow in
    /// insertion order.
    #[must_use]
    pub fn effective_patterns(&self) -> PatternSet {
        let mut set = PatternSet::builtin();
        for pattern in &self.custom {
            set.upsert(pattern.clone());
        }
        set
    }
}
