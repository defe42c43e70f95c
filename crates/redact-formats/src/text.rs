//! Plain text adapter.

use crate::adapter::{AdapterOutcome, DocumentKind, FormatAdapter};
use redact_core::fs::write_atomic;
use redact_core::{RedactError, RedactionLevel, Result};
use redact_engine::RedactionContext;
use std::path::Path;

/// Read `path` as UTF-8.
pub(crate) fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| RedactError::UnsupportedEncoding {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Redacts `.txt` files as a single unit.
pub struct TextAdapter {
    context: RedactionContext,
}

impl TextAdapter {
    /// Create the adapter.
    #[must_use]
    pub fn new(context: RedactionContext) -> Self {
        Self { context }
    }
}

impl FormatAdapter for TextAdapter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Text
    }

    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome> {
        let text = read_utf8(input)?;
        let redacted = self.context.redact_text(&text, level)?;

        write_atomic(output, redacted.as_bytes())?;
        Ok(AdapterOutcome {
            units_processed: 1,
            units_redacted: usize::from(redacted != text),
        })
    }
}
