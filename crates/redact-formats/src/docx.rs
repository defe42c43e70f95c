//! Word document adapter.
//!
//! Paragraphs are redacted in the body, headers, footers, footnotes and
//! endnotes. Formatting of a paragraph's first run is kept for the redacted
//! text; later runs are emptied.

use crate::adapter::{AdapterOutcome, DocumentKind, FormatAdapter};
use crate::ooxml::{rewrite_blocks, Package, TextBlock, TextRun};
use once_cell::sync::Lazy;
use redact_core::{RedactError, RedactionLevel, RedactionScope, Result};
use redact_engine::RedactionContext;
use regex::Regex;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

// Paragraph open/close/empty tags and text runs. `<w:pPr>`, `<w:proofErr>`
// and `<w:tab/>` do not match.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/)?w:p(?:\s[^>]*?)?(/)?>|<w:t(?:\s[^>]*)?>([^<]*)</w:t>")
        .expect("valid paragraph regex")
});

static STORY_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^word/(?:document|header\d*|footer\d*|footnotes|endnotes)\.xml$")
        .expect("valid part name regex")
});

/// A paragraph and where it starts in the part.
struct Paragraph {
    start: usize,
    block: TextBlock,
}

/// Paragraphs of `xml` in document order.
///
/// Runs belong to their innermost enclosing paragraph, so a text box nested
/// in a paragraph yields its own paragraphs.
fn scan_paragraphs(xml: &str) -> Vec<Paragraph> {
    let mut open: Vec<Paragraph> = Vec::new();
    let mut done = Vec::new();

    for caps in TOKEN.captures_iter(xml) {
        let Some(whole) = caps.get(0) else { continue };

        if let Some(content) = caps.get(3) {
            if let Some(paragraph) = open.last_mut() {
                paragraph.block.runs.push(TextRun {
                    tag: whole.start()..content.start(),
                    content: content.range(),
                });
            }
        } else if caps.get(2).is_some() {
            done.push(Paragraph {
                start: whole.start(),
                block: TextBlock::default(),
            });
        } else if caps.get(1).is_some() {
            if let Some(paragraph) = open.pop() {
                done.push(paragraph);
            }
        } else {
            open.push(Paragraph {
                start: whole.start(),
                block: TextBlock::default(),
            });
        }
    }

    done.sort_by_key(|p| p.start);
    done
}

/// Paragraph texts of the document body, in order.
///
/// Empty paragraphs are included as empty strings.
pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>> {
    let package = Package::open(path)?;
    let xml = package
        .xml_part(DOCUMENT_PART)?
        .ok_or_else(|| missing_document(path))?;

    Ok(scan_paragraphs(&xml)
        .iter()
        .map(|p| p.block.text(&xml))
        .collect())
}

fn missing_document(path: &Path) -> RedactError {
    RedactError::CorruptContainer {
        path: path.to_path_buf(),
        reason: format!("missing {DOCUMENT_PART}"),
    }
}

/// Redacts `.docx` files paragraph by paragraph.
pub struct DocxAdapter {
    context: RedactionContext,
    scope: RedactionScope,
}

impl DocxAdapter {
    /// Create the adapter.
    #[must_use]
    pub fn new(context: RedactionContext, scope: RedactionScope) -> Self {
        Self { context, scope }
    }
}

struct StoryPart {
    name: String,
    xml: String,
    paragraphs: Vec<Paragraph>,
}

impl FormatAdapter for DocxAdapter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome> {
        let mut package = Package::open(input)?;
        if !package.contains(DOCUMENT_PART) {
            return Err(missing_document(input));
        }

        let names: Vec<String> = package
            .part_names()
            .filter(|name| STORY_PART.is_match(name))
            .map(str::to_string)
            .collect();

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            if let Some(xml) = package.xml_part(&name)? {
                let paragraphs: Vec<Paragraph> = scan_paragraphs(&xml)
                    .into_iter()
                    .filter(|p| !p.block.runs.is_empty())
                    .collect();
                parts.push(StoryPart {
                    name,
                    xml,
                    paragraphs,
                });
            }
        }

        let units: Vec<String> = parts
            .iter()
            .flat_map(|part| part.paragraphs.iter().map(|p| p.block.text(&part.xml)))
            .collect();
        let redacted = self.context.redact_units(&units, level, self.scope)?;

        let mut outcome = AdapterOutcome {
            units_processed: units.len(),
            units_redacted: 0,
        };

        let mut offset = 0;
        for part in &parts {
            let count = part.paragraphs.len();
            let originals = &units[offset..offset + count];
            let replacements = &redacted[offset..offset + count];
            offset += count;

            let changed: Vec<(&TextBlock, &str)> = part
                .paragraphs
                .iter()
                .zip(originals.iter().zip(replacements))
                .filter(|(_, (before, after))| before != after)
                .map(|(p, (_, after))| (&p.block, after.as_str()))
                .collect();

            if changed.is_empty() {
                continue;
            }

            tracing::debug!(part = %part.name, paragraphs = changed.len(), "rewriting paragraphs");
            outcome.units_redacted += changed.len();
            let xml = rewrite_blocks(&part.xml, &changed);
            package.replace_part(&part.name, xml.into_bytes());
        }

        package.write_to(output)?;
        Ok(outcome)
    }
}
