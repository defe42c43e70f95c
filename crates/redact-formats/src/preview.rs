use crate::adapter::DocumentKind;
use crate::docx::extract_paragraphs;
use crate::text::read_utf8;
use redact_core::{RedactError, RedactionLevel, Result};
use redact_engine::RedactionContext;
use std::path::Path;

/// Redacted text of `path` without writing anything.
///
/// Available for plain text and Word documents; a document's paragraphs are
/// joined with newlines and redacted as one text. Returns `Ok(None)` for
/// other formats.
pub fn preview(
    context: &RedactionContext,
    path: &Path,
    level: RedactionLevel,
) -> Result<Option<String>> {
    if !path.is_file() {
        return Err(RedactError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = match DocumentKind::from_path(path) {
        Some(DocumentKind::Text) => read_utf8(path)?,
        Some(DocumentKind::Docx) => extract_paragraphs(path)?.join("\n"),
        _ => return Ok(None),
    };

    context.redact_text(&text, level).map(Some)
}
