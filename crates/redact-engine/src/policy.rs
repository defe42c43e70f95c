//! Mapping from redaction level to what gets removed.

use redact_core::RedactionLevel;
use std::collections::BTreeSet;

/// Recognizer label for people.
pub const PERSON: &str = "PERSON";
/// Recognizer label for organizations.
pub const ORG: &str = "ORG";
/// Recognizer label for geopolitical entities (countries, cities, states).
pub const GPE: &str = "GPE";

/// Entity labels selected for redaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSet {
    /// Every label the recognizer produces
    All,
    /// Only the listed labels
    Only(BTreeSet<String>),
}

impl LabelSet {
    /// Whether `label` is selected.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(labels) => labels.contains(label),
        }
    }

    fn only(labels: &[&str]) -> Self {
        Self::Only(labels.iter().map(|l| (*l).to_string()).collect())
    }
}

/// What a single redaction level removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionPolicy {
    /// Entity labels to redact
    pub labels: LabelSet,
    /// Whether the pattern library runs after entity substitution
    pub apply_patterns: bool,
}

impl RedactionPolicy {
    /// Policy preset for a level.
    #[must_use]
    pub fn from_level(level: RedactionLevel) -> Self {
        match level {
            RedactionLevel::Basic => Self {
                labels: LabelSet::only(&[PERSON]),
                apply_patterns: false,
            },
            RedactionLevel::Intermediate => Self {
                labels: LabelSet::only(&[PERSON, ORG, GPE]),
                apply_patterns: true,
            },
            RedactionLevel::Advanced => Self {
                labels: LabelSet::All,
                apply_patterns: true,
            },
        }
    }
}

/// Entity labels selected at `level`.
#[must_use]
pub fn labels_for_level(level: RedactionLevel) -> LabelSet {
    RedactionPolicy::from_level(level).labels
}

/// Whether pattern substitution runs at `level`.
#[must_use]
pub fn patterns_apply(level: RedactionLevel) -> bool {
    RedactionPolicy::from_level(level).apply_patterns
}
