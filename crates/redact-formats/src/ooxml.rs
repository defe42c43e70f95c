//! Office Open XML package access and text-run rewriting.
//!
//! Both `.docx` and `.xlsx` are ZIP packages of XML parts. Text lives in run
//! elements (`<w:t>` and `<t>`); a logical unit (paragraph, shared string,
//! inline cell) is the concatenation of its runs. Rewriting puts the whole
//! redacted unit into the first run and empties the rest, which keeps every
//! other byte of the part intact.

use once_cell::sync::Lazy;
use redact_core::fs::write_atomic_with;
use redact_core::{RedactError, Result};
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{self, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("valid entity regex")
});

struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// An OOXML package read fully into memory, entry order preserved.
pub(crate) struct Package {
    path: PathBuf,
    entries: Vec<PackageEntry>,
}

impl Package {
    /// Read every entry of the ZIP at `path`.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let corrupt = |reason: String| RedactError::CorruptContainer {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| corrupt(e.to_string()))?;
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| corrupt(format!("{}: {e}", entry.name())))?;
            entries.push(PackageEntry {
                name: entry.name().to_string(),
                is_dir: entry.is_dir(),
                data,
            });
        }

        tracing::trace!(parts = entries.len(), "opened {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Names of all entries, in archive order.
    pub(crate) fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Whether a part named `name` exists.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// A part decoded as UTF-8 XML.
    pub(crate) fn xml_part(&self, name: &str) -> Result<Option<String>> {
        let Some(entry) = self.entries.iter().find(|e| e.name == name) else {
            return Ok(None);
        };

        String::from_utf8(entry.data.clone())
            .map(Some)
            .map_err(|e| RedactError::CorruptContainer {
                path: self.path.clone(),
                reason: format!("{name} is not UTF-8: {e}"),
            })
    }

    /// Replace the contents of an existing part.
    pub(crate) fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.data = data;
        }
    }

    /// Write the package to `output` atomically.
    ///
    /// Media is stored uncompressed and everything else deflated, the layout
    /// Office applications produce.
    pub(crate) fn write_to(&self, output: &Path) -> Result<()> {
        write_atomic_with(output, |file| -> Result<()> {
            let mut zip = ZipWriter::new(file.as_file_mut());
            for entry in &self.entries {
                let method = if entry.name.contains("/media/") {
                    CompressionMethod::Stored
                } else {
                    CompressionMethod::Deflated
                };
                let options = SimpleFileOptions::default().compression_method(method);

                if entry.is_dir {
                    zip.add_directory(entry.name.as_str(), options)
                        .map_err(io::Error::other)?;
                } else {
                    zip.start_file(entry.name.as_str(), options)
                        .map_err(io::Error::other)?;
                    zip.write_all(&entry.data)?;
                }
            }
            zip.finish().map_err(io::Error::other)?;
            Ok(())
        })
    }
}

/// Decode the five predefined XML entities and numeric character references.
pub(crate) fn xml_unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            match entity {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                        .map_or_else(|| caps[0].to_string(), |c| c.to_string())
                }
            }
        })
        .into_owned()
}

/// Escape text for use as element content.
pub(crate) fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Byte ranges of one text run inside a part.
#[derive(Debug, Clone)]
pub(crate) struct TextRun {
    /// Opening tag, e.g. `<w:t xml:space="preserve">`
    pub tag: Range<usize>,
    /// Escaped text between the opening and closing tags
    pub content: Range<usize>,
}

/// A logical unit made of one or more runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextBlock {
    pub runs: Vec<TextRun>,
}

impl TextBlock {
    /// Unescaped text of all runs concatenated.
    pub(crate) fn text(&self, xml: &str) -> String {
        self.runs
            .iter()
            .map(|run| xml_unescape(&xml[run.content.clone()]))
            .collect()
    }
}

/// Rewrite `xml` so each block holds its replacement text.
///
/// Blocks must not share runs. The replacement goes into the first run,
/// which is marked `xml:space="preserve"` so surrounding whitespace survives;
/// the remaining runs are emptied.
pub(crate) fn rewrite_blocks(xml: &str, replacements: &[(&TextBlock, &str)]) -> String {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for (block, text) in replacements {
        let Some((first, rest)) = block.runs.split_first() else {
            continue;
        };

        let tag = preserve_space(&xml[first.tag.clone()]);
        edits.push((first.tag.start..first.content.end, tag + &xml_escape(text)));
        for run in rest {
            edits.push((run.content.clone(), String::new()));
        }
    }

    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut result = xml.to_string();
    for (range, replacement) in edits {
        result.replace_range(range, &replacement);
    }
    result
}

fn preserve_space(tag: &str) -> String {
    if tag.contains("xml:space") {
        return tag.to_string();
    }
    let name_end = tag
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(tag.len());
    format!("{} xml:space=\"preserve\"{}", &tag[..name_end], &tag[name_end..])
}
