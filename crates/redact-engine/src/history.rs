//! Undo/redo log of completed redaction operations.
//!
//! Only metadata is kept: undoing an entry moves the cursor, it does not
//! restore any file.

use chrono::{DateTime, Utc};
use redact_core::RedactionLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A completed redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique entry ID
    pub id: Uuid,
    /// File that was read
    pub input_path: PathBuf,
    /// File that was written
    pub output_path: PathBuf,
    /// Level applied
    pub redaction_level: RedactionLevel,
    /// When the operation completed
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create an entry timestamped now.
    #[must_use]
    pub fn new(input_path: &Path, output_path: &Path, redaction_level: RedactionLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            redaction_level,
            timestamp: Utc::now(),
        }
    }

    /// One-line summary for display.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "[{}] {} -> {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.input_path.display(),
            self.output_path.display(),
            self.redaction_level
        )
    }
}

/// Linear history with a cursor.
///
/// Pushing after an undo discards the entries past the cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl HistoryStack {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed operation and make it current.
    pub fn push(&mut self, entry: HistoryEntry) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        if keep < self.entries.len() {
            tracing::debug!(discarded = self.entries.len() - keep, "truncating redo history");
            self.entries.truncate(keep);
        }
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry and return the new current entry.
    ///
    /// Returns `None` at the first entry or when the history is empty.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one entry and return it.
    ///
    /// Returns `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.entries.len() {
            self.cursor = Some(next);
            self.entries.get(next)
        } else {
            None
        }
    }

    /// Entry at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// All retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
