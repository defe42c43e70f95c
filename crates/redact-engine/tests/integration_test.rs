//! Integration tests for the redaction engine
//!
//! Exercises level policy, pattern handling and history through the public
//! context API with a scripted recognizer.

use redact_engine::{
    Detection, EntityRecognizer, HistoryEntry, HistoryStack, PatternSet, RedactError,
    RedactionContext, RedactionLevel, Result, StaticRecognizer, REDACTION_MARKER,
};
use std::path::Path;
use std::sync::Arc;

/// Recognizer that labels fixed strings, like a trained model would.
fn scripted() -> Arc<dyn EntityRecognizer> {
    Arc::new(StaticRecognizer::new(vec![
        Detection::new("John Smith", "PERSON"),
        Detection::new("Globex", "ORG"),
        Detection::new("Springfield", "GPE"),
        Detection::new("last Tuesday", "DATE"),
    ]))
}

const SAMPLE: &str = "John Smith from Globex visited Springfield last Tuesday. \
Reach him at john.smith@globex.com or 555-123-4567, see https://globex.com/team.";

#[test]
fn test_contact_scenario() {
    let context = RedactionContext::new(scripted());

    let redacted = context
        .redact_text("Contact John Smith at john@example.com", RedactionLevel::Intermediate)
        .expect("redact");

    assert_eq!(redacted, "Contact [REDACTED] at [REDACTED]");
}

#[test]
fn test_basic_only_touches_people() {
    let context = RedactionContext::new(scripted());

    let redacted = context
        .redact_text(SAMPLE, RedactionLevel::Basic)
        .expect("redact");

    assert!(!redacted.contains("John Smith"));
    // Everything except the person span is byte-identical
    assert_eq!(redacted, SAMPLE.replace("John Smith", REDACTION_MARKER));
}

#[test]
fn test_advanced_removes_everything_detected() {
    let context = RedactionContext::new(scripted());

    let redacted = context
        .redact_text(SAMPLE, RedactionLevel::Advanced)
        .expect("redact");

    for needle in [
        "John Smith",
        "Globex",
        "Springfield",
        "last Tuesday",
        "john.smith@globex.com",
        "555-123-4567",
        "https://globex.com/team",
    ] {
        assert!(!redacted.contains(needle), "{needle} survived: {redacted}");
    }

    for pattern in PatternSet::builtin().iter() {
        assert!(
            !pattern.regex().is_match(&redacted),
            "{} still matches: {redacted}",
            pattern.name()
        );
    }
}

#[test]
fn test_redaction_is_idempotent() {
    let context = RedactionContext::new(scripted());

    for level in RedactionLevel::ALL {
        let once = context.redact_text(SAMPLE, level).expect("first pass");
        let twice = context.redact_text(&once, level).expect("second pass");
        assert_eq!(once, twice, "level {level} is not idempotent");
    }
}

#[test]
fn test_invalid_pattern_is_rejected_without_side_effects() {
    let context = RedactionContext::new(scripted());
    context
        .add_pattern("employee_id", r"EMP-\d{6}")
        .expect("add valid pattern");
    let before = context.pattern_snapshot().names().join(",");

    let err = context
        .add_pattern("broken", r"(EMP-\d{6}")
        .expect_err("unbalanced group must be rejected");
    assert!(matches!(err, RedactError::InvalidPattern { ref name, .. } if name == "broken"));

    assert_eq!(context.pattern_snapshot().names().join(","), before);
    assert_eq!(
        context
            .redact_text("badge EMP-123456", RedactionLevel::Intermediate)
            .expect("redact"),
        "badge [REDACTED]"
    );
}

#[test]
fn test_custom_patterns_do_not_apply_at_basic() {
    let context = RedactionContext::new(scripted());
    context
        .add_pattern("employee_id", r"EMP-\d{6}")
        .expect("add pattern");

    assert_eq!(
        context
            .redact_text("badge EMP-123456", RedactionLevel::Basic)
            .expect("redact"),
        "badge EMP-123456"
    );
}

#[test]
fn test_history_discards_redo_branch() {
    let mut history = HistoryStack::new();
    for name in ["A", "B", "C"] {
        history.push(HistoryEntry::new(
            Path::new(name),
            Path::new("out"),
            RedactionLevel::Basic,
        ));
    }

    history.undo();
    history.undo();
    history.push(HistoryEntry::new(
        Path::new("D"),
        Path::new("out"),
        RedactionLevel::Basic,
    ));

    let inputs: Vec<_> = history
        .entries()
        .iter()
        .map(|e| e.input_path.display().to_string())
        .collect();
    assert_eq!(inputs, vec!["A", "D"]);
    assert_eq!(
        history.current().map(|e| e.input_path.display().to_string()),
        Some("D".to_string())
    );
}

#[test]
fn test_recognizer_failure_is_a_collaborator_error() {
    struct Offline;

    impl EntityRecognizer for Offline {
        fn recognize(&self, _text: &str) -> Result<Vec<Detection>> {
            Err(RedactError::Recognizer("service unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    let context = RedactionContext::new(Arc::new(Offline));
    let err = context
        .redact_text("anything", RedactionLevel::Basic)
        .expect_err("recognizer is offline");
    assert!(err.is_collaborator_error());

    // Empty input never reaches the recognizer
    assert_eq!(
        context
            .redact_text("", RedactionLevel::Basic)
            .expect("empty input"),
        ""
    );
}
