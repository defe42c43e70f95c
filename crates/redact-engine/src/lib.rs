//! Redact Engine - the policy and text redaction core.
//!
//! This crate decides what gets redacted at each sensitivity level and
//! performs the text substitution that every format adapter delegates to.
//!
//! ## Architecture
//!
//! - **Pattern Library**: built-in detectors plus validated user patterns
//! - **Redaction Policy**: level to entity labels, and whether patterns apply
//! - **Text Redactor**: entity substitution followed by pattern substitution
//! - **History Stack**: linear undo/redo log of completed operations
//! - **Redaction Context**: explicit owner of the shared pattern set and history
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use redact_core::{Detection, RedactionLevel};
//! use redact_engine::{RedactionContext, StaticRecognizer};
//!
//! let recognizer = StaticRecognizer::new(vec![Detection::new("John Smith", "PERSON")]);
//! let context = RedactionContext::new(Arc::new(recognizer));
//!
//! let redacted = context
//!     .redact_text("Contact John Smith at john@example.com", RedactionLevel::Intermediate)
//!     .expect("redact");
//! assert_eq!(redacted, "Contact [REDACTED] at [REDACTED]");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Shared pattern set and history owner.
pub mod context;
/// Linear undo/redo log of completed operations.
pub mod history;
/// Built-in and user-defined regular expression detectors.
pub mod patterns;
/// Level to label mapping.
pub mod policy;
/// Entity recognizer seam and shipped backends.
pub mod recognizer;
/// Entity and pattern substitution.
pub mod redactor;

pub use context::RedactionContext;
pub use history::{HistoryEntry, HistoryStack};
pub use patterns::{NamedPattern, PatternLibrary, PatternSet};
pub use policy::{labels_for_level, patterns_apply, LabelSet, RedactionPolicy, GPE, ORG, PERSON};
pub use recognizer::{EntityRecognizer, GazetteerRecognizer, HttpRecognizer, StaticRecognizer};
pub use redactor::{apply_detections, TextRedactor, REDACTION_MARKER};

// Re-export core types used in this crate's API
pub use redact_core::{Detection, RedactError, RedactionLevel, RedactionScope, Result};
