//! Named-entity recognition backends.
//!
//! The engine only needs `text -> [(span text, label)]`; everything about how
//! entities are found lives behind [`EntityRecognizer`].

use once_cell::sync::OnceCell;
use redact_core::{Detection, RedactError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Finds named entities in text.
///
/// Implementations are called from blocking worker threads and must be
/// shareable across them.
pub trait EntityRecognizer: Send + Sync {
    /// Detect entities in `text`.
    ///
    /// # Errors
    /// Returns `RedactError::Recognizer` if the backend fails.
    fn recognize(&self, text: &str) -> Result<Vec<Detection>>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Recognizer that reports a fixed list of entities wherever they occur.
///
/// Useful when the entities are already known, and as a test double.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    detections: Vec<Detection>,
}

impl StaticRecognizer {
    /// Create a recognizer reporting `detections`.
    #[must_use]
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl EntityRecognizer for StaticRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Detection>> {
        Ok(self
            .detections
            .iter()
            .filter(|d| text.contains(&d.text))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

struct GazetteerTerm {
    label: String,
    regex: Regex,
}

/// Dictionary recognizer: known terms per label, matched as whole words.
///
/// Matching is case-sensitive. Where terms overlap the earlier match wins,
/// and the longer one wins when two start at the same offset.
pub struct GazetteerRecognizer {
    terms: Vec<GazetteerTerm>,
}

impl GazetteerRecognizer {
    /// Build a recognizer from a label to terms map.
    ///
    /// # Errors
    /// Returns `RedactError::Recognizer` if a term cannot be compiled.
    pub fn new(gazetteer: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut terms = Vec::new();

        for (label, words) in gazetteer {
            for word in words {
                let word = word.trim();
                if word.is_empty() {
                    continue;
                }
                terms.push(GazetteerTerm {
                    label: label.clone(),
                    regex: term_regex(word)?,
                });
            }
        }

        tracing::debug!("Gazetteer loaded with {} terms", terms.len());
        Ok(Self { terms })
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no terms are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn term_regex(term: &str) -> Result<Regex> {
    let starts_word = term.chars().next().is_some_and(char::is_alphanumeric);
    let ends_word = term.chars().last().is_some_and(char::is_alphanumeric);

    let expression = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(term),
        if ends_word { r"\b" } else { "" },
    );

    Regex::new(&expression)
        .map_err(|e| RedactError::Recognizer(format!("invalid gazetteer term '{term}': {e}")))
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Detection>> {
        let mut found: Vec<(usize, usize, &str)> = Vec::new();
        for term in &self.terms {
            for m in term.regex.find_iter(text) {
                found.push((m.start(), m.end(), term.label.as_str()));
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut detections = Vec::new();
        let mut last_end = 0;
        for (start, end, label) in found {
            if start < last_end {
                continue;
            }
            detections.push(Detection::new(&text[start..end], label).with_span(start, end));
            last_end = end;
        }

        Ok(detections)
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

impl std::fmt::Debug for GazetteerRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GazetteerRecognizer")
            .field("terms", &self.terms.len())
            .finish()
    }
}

/// Recognizer backed by a remote NER service.
///
/// Sends `{"text": ...}` as a JSON POST and expects
/// `{"entities": [{"text", "label", "start", "end"}]}` back. Offsets are
/// optional.
#[derive(Debug)]
pub struct HttpRecognizer {
    endpoint: String,
    timeout: Duration,
    // Built on first use so construction is safe inside an async runtime.
    client: OnceCell<reqwest::blocking::Client>,
}

impl HttpRecognizer {
    /// Create a recognizer for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            client: OnceCell::new(),
        }
    }

    /// Service endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        self.client.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| RedactError::Recognizer(format!("failed to create HTTP client: {e}")))
        })
    }
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    entities: Vec<NerEntity>,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    text: String,
    label: String,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

impl From<NerEntity> for Detection {
    fn from(entity: NerEntity) -> Self {
        Self {
            text: entity.text,
            label: entity.label,
            start: entity.start,
            end: entity.end,
        }
    }
}

impl EntityRecognizer for HttpRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Detection>> {
        let response = self
            .client()?
            .post(&self.endpoint)
            .json(&NerRequest { text })
            .send()
            .map_err(|e| {
                RedactError::Recognizer(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RedactError::Recognizer(format!(
                "{} returned {}: {body}",
                self.endpoint,
                status.as_u16()
            )));
        }

        let parsed: NerResponse = response
            .json()
            .map_err(|e| RedactError::Recognizer(format!("failed to parse response: {e}")))?;

        tracing::trace!(entities = parsed.entities.len(), "NER response");
        Ok(parsed.entities.into_iter().map(Detection::from).collect())
    }

    fn name(&self) -> &str {
        "http"
    }
}
