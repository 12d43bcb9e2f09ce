//! Synthesized conclusion

use super::answer::{AnswerRevision, Metadata};
use crate::catalog::provider::ModelId;
use serde::{Deserialize, Serialize};

/// Text combining several answers
///
/// Built from a snapshot of the answers taken when synthesis was requested;
/// `sources` records which answer revisions that snapshot contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub model_used: ModelId,
    #[serde(default)]
    pub sources: Vec<AnswerRevision>,
}

impl Conclusion {
    pub fn new(text: impl Into<String>, model_used: impl Into<ModelId>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
            model_used: model_used.into(),
            sources: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_sources(mut self, sources: Vec<AnswerRevision>) -> Self {
        self.sources = sources;
        self
    }
}
