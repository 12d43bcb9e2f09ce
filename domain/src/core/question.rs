//! Question value object

use crate::util::preview;
use serde::{Deserialize, Serialize};

/// Number of characters shown in the collapsed question bar.
pub const QUESTION_PREVIEW_CHARS: usize = 80;

/// Starter questions offered when the user asks for an example
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What makes a life meaningful?",
    "Should I follow my passion or pursue stability?",
    "How should I deal with the fear of death?",
    "Is it wrong to lie to protect someone's feelings?",
    "How do I forgive someone who hurt me?",
    "What do I owe to strangers?",
    "Is happiness something to pursue or a by-product?",
    "How should I respond when life feels absurd?",
];

/// A life question posed to the council (Value Object)
///
/// The session edits a draft question until it is submitted, so a blank
/// question is representable; [`Question::is_submittable`] decides whether it
/// may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a question from raw text (kept verbatim, including whitespace)
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True when the question is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// A question can be submitted only when it is non-blank after trimming
    pub fn is_submittable(&self) -> bool {
        !self.is_blank()
    }

    /// Short form for the collapsed question bar
    pub fn preview(&self) -> String {
        preview(&self.content, QUESTION_PREVIEW_CHARS)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_keeps_raw_text() {
        let q = Question::new("  How should I live?  ");
        assert_eq!(q.content(), "  How should I live?  ");
    }

    #[test]
    fn test_blank_questions_are_not_submittable() {
        assert!(!Question::new("").is_submittable());
        assert!(!Question::new("   \n\t").is_submittable());
        assert!(Question::default().is_blank());
    }

    #[test]
    fn test_non_blank_question_is_submittable() {
        assert!(Question::from("Is it worth changing careers?").is_submittable());
    }

    #[test]
    fn test_preview_truncates_long_questions() {
        let long = "x".repeat(100);
        let q = Question::new(long);
        let preview = q.preview();
        assert_eq!(preview.len(), QUESTION_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Question::new("Why?")).unwrap();
        assert_eq!(json, "\"Why?\"");
    }
}
