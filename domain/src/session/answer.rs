//! Generated answers and the insertion-ordered answer set

use crate::catalog::perspective::PerspectiveId;
use crate::catalog::provider::{ModelId, Provider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value reported by the backend
///
/// The contract promises scalars; anything else is kept as raw JSON so it
/// still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Null => write!(f, "null"),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::Text(s) => write!(f, "{}", s),
            MetadataValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(x: f64) -> Self {
        MetadataValue::Float(x)
    }
}

/// Generation metadata, ordered by key so every rendering is stable
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Generated text for one perspective on one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub perspective: PerspectiveId,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub provider_used: Provider,
    pub model_used: ModelId,
}

impl Answer {
    pub fn new(
        perspective: impl Into<PerspectiveId>,
        text: impl Into<String>,
        provider_used: Provider,
        model_used: impl Into<ModelId>,
    ) -> Self {
        Self {
            perspective: perspective.into(),
            text: text.into(),
            metadata: Metadata::new(),
            provider_used,
            model_used: model_used.into(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Revision marker of one answer, used to tell whether a conclusion was
/// built from the answers currently held.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerRevision {
    pub perspective: PerspectiveId,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    answer: Answer,
    revision: u64,
}

/// Answers keyed by perspective, in generation order
///
/// At most one answer per perspective. Replacing an answer keeps its
/// position; new perspectives are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    entries: Vec<Entry>,
    next_revision: u64,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, perspective: &PerspectiveId) -> bool {
        self.position(perspective).is_some()
    }

    pub fn get(&self, perspective: &PerspectiveId) -> Option<&Answer> {
        self.position(perspective).map(|i| &self.entries[i].answer)
    }

    /// Answers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter().map(|e| &e.answer)
    }

    pub fn perspectives(&self) -> impl Iterator<Item = &PerspectiveId> {
        self.entries.iter().map(|e| &e.answer.perspective)
    }

    pub fn first(&self) -> Option<&PerspectiveId> {
        self.entries.first().map(|e| &e.answer.perspective)
    }

    /// Insert or replace the answer for its perspective.
    ///
    /// Returns `true` when an existing answer was replaced.
    pub fn upsert(&mut self, answer: Answer) -> bool {
        let revision = self.next_revision;
        self.next_revision += 1;
        match self.position(&answer.perspective) {
            Some(i) => {
                self.entries[i] = Entry { answer, revision };
                true
            }
            None => {
                self.entries.push(Entry { answer, revision });
                false
            }
        }
    }

    pub fn remove(&mut self, perspective: &PerspectiveId) -> Option<Answer> {
        self.position(perspective)
            .map(|i| self.entries.remove(i).answer)
    }

    /// Keep only answers whose perspective satisfies `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&PerspectiveId) -> bool) {
        self.entries.retain(|e| keep(&e.answer.perspective));
    }

    /// `(perspective, text)` pairs in insertion order
    pub fn texts(&self) -> Vec<(PerspectiveId, String)> {
        self.entries
            .iter()
            .map(|e| (e.answer.perspective.clone(), e.answer.text.clone()))
            .collect()
    }

    /// Current revision of every answer, in insertion order
    pub fn revisions(&self) -> Vec<AnswerRevision> {
        self.entries
            .iter()
            .map(|e| AnswerRevision {
                perspective: e.answer.perspective.clone(),
                revision: e.revision,
            })
            .collect()
    }

    fn position(&self, perspective: &PerspectiveId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| &e.answer.perspective == perspective)
    }
}
