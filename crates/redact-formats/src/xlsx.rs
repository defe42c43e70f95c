//! Excel workbook adapter.
//!
//! Text in a workbook lives in two places: the shared-string table, referenced
//! by `t="s"` cells, and inline-string cells (`t="inlineStr"`). Both are
//! redacted. Numeric, boolean, error and formula cells are never touched,
//! including formulas with a cached string result (`t="str"`), because their
//! value is recomputed by the spreadsheet application.

use crate::adapter::{AdapterOutcome, DocumentKind, FormatAdapter};
use crate::ooxml::{rewrite_blocks, Package, TextBlock, TextRun};
use once_cell::sync::Lazy;
use redact_core::{RedactError, RedactionLevel, RedactionScope, Result};
use redact_engine::RedactionContext;
use regex::Regex;
use std::path::Path;

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";

static SHARED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<si(?:\s[^>]*)?>(.*?)</si>").expect("valid shared string regex")
});

// Self-closing cells are matched first so they never swallow the next cell.
static CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<c\s[^>]*/>|(?s)<c\s([^>]*)>(.*?)</c>"#).expect("valid cell regex")
});

static INLINE_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bt="inlineStr""#).expect("valid cell type regex"));

static RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<t(?:\s[^>]*)?>([^<]*)</t>").expect("valid text run regex"));

static WORKSHEET_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^xl/worksheets/[^/]+\.xml$").expect("valid worksheet name regex")
});

/// Text runs of `inner`, which starts at byte `offset` of its part.
fn runs_in(offset: usize, inner: &str) -> TextBlock {
    TextBlock {
        runs: RUN
            .captures_iter(inner)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let content = caps.get(1)?;
                Some(TextRun {
                    tag: offset + whole.start()..offset + content.start(),
                    content: offset + content.start()..offset + content.end(),
                })
            })
            .collect(),
    }
}

/// Shared-string items, in table order.
fn scan_shared_strings(xml: &str) -> Vec<TextBlock> {
    SHARED_ITEM
        .captures_iter(xml)
        .filter_map(|caps| {
            let inner = caps.get(1)?;
            Some(runs_in(inner.start(), inner.as_str()))
        })
        .collect()
}

/// Inline-string cells of a worksheet, in sheet order.
fn scan_inline_cells(xml: &str) -> Vec<TextBlock> {
    CELL.captures_iter(xml)
        .filter_map(|caps| {
            let attributes = caps.get(1)?;
            let inner = caps.get(2)?;
            if !INLINE_STRING.is_match(attributes.as_str()) {
                return None;
            }
            Some(runs_in(inner.start(), inner.as_str()))
        })
        .collect()
}

/// Redacts textual cell values of `.xlsx` workbooks.
pub struct XlsxAdapter {
    context: RedactionContext,
    scope: RedactionScope,
}

impl XlsxAdapter {
    /// Create the adapter.
    #[must_use]
    pub fn new(context: RedactionContext, scope: RedactionScope) -> Self {
        Self { context, scope }
    }
}

struct TextPart {
    name: String,
    xml: String,
    blocks: Vec<TextBlock>,
}

impl FormatAdapter for XlsxAdapter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Xlsx
    }

    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome> {
        let mut package = Package::open(input)?;
        if !package.contains(WORKBOOK_PART) {
            return Err(RedactError::CorruptContainer {
                path: input.to_path_buf(),
                reason: format!("missing {WORKBOOK_PART}"),
            });
        }

        let mut names: Vec<String> = Vec::new();
        if package.contains(SHARED_STRINGS_PART) {
            names.push(SHARED_STRINGS_PART.to_string());
        }
        names.extend(
            package
                .part_names()
                .filter(|name| WORKSHEET_PART.is_match(name))
                .map(str::to_string),
        );

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let Some(xml) = package.xml_part(&name)? else {
                continue;
            };
            let blocks: Vec<TextBlock> = if name == SHARED_STRINGS_PART {
                scan_shared_strings(&xml)
            } else {
                scan_inline_cells(&xml)
            }
            .into_iter()
            .filter(|b| !b.runs.is_empty())
            .collect();
            parts.push(TextPart { name, xml, blocks });
        }

        let units: Vec<String> = parts
            .iter()
            .flat_map(|part| part.blocks.iter().map(|b| b.text(&part.xml)))
            .collect();
        let redacted = self.context.redact_units(&units, level, self.scope)?;

        let mut outcome = AdapterOutcome {
            units_processed: units.len(),
            units_redacted: 0,
        };

        let mut offset = 0;
        for part in &parts {
            let count = part.blocks.len();
            let changed: Vec<(&TextBlock, &str)> = part
                .blocks
                .iter()
                .zip(&units[offset..offset + count])
                .zip(&redacted[offset..offset + count])
                .filter(|((_, before), after)| before != after)
                .map(|((block, _), after)| (block, after.as_str()))
                .collect();
            offset += count;

            if changed.is_empty() {
                continue;
            }

            tracing::debug!(part = %part.name, cells = changed.len(), "rewriting cells");
            outcome.units_redacted += changed.len();
            let xml = rewrite_blocks(&part.xml, &changed);
            package.replace_part(&part.name, xml.into_bytes());
        }

        package.write_to(output)?;
        Ok(outcome)
    }
}
