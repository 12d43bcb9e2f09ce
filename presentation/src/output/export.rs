//! Session export
//!
//! Renders a question, its answers (in insertion order) and an optional
//! conclusion into a Markdown, plain-text or HTML document. Rendering is
//! pure: identical input yields byte-identical output.

use council_domain::{Answer, EscapePolicy, ExportFormat, SessionState};
use std::borrow::Cow;
use std::path::Path;

/// A rendered export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub content: String,
    pub mime_type: &'static str,
    pub filename: String,
}

impl ExportDocument {
    /// Write the document to `path`, or to `./<filename>` when `path` is a
    /// directory
    pub fn save(&self, path: &Path) -> std::io::Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.filename)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, &self.content)?;
        Ok(target)
    }
}

/// Format-specific pieces of a document
trait Layout {
    fn question(&self, out: &mut String, question: &str);
    fn answers_heading(&self, out: &mut String);
    fn answer(&self, out: &mut String, answer: &Answer);
    fn conclusion(&self, out: &mut String, conclusion: &str);
}

struct MarkdownLayout;

impl Layout for MarkdownLayout {
    fn question(&self, out: &mut String, question: &str) {
        out.push_str("# Your Question\n\n");
        if !question.is_empty() {
            out.push_str(&format!("{}\n\n", question));
        }
    }

    fn answers_heading(&self, out: &mut String) {
        out.push_str("# Perspectives & Answers\n\n");
    }

    fn answer(&self, out: &mut String, answer: &Answer) {
        out.push_str(&format!("## {}\n", answer.perspective));
        if !answer.text.is_empty() {
            out.push_str(&format!("{}\n", answer.text));
        }
        if !answer.metadata.is_empty() {
            out.push_str("\n**Metadata:**\n");
            for (key, value) in &answer.metadata {
                out.push_str(&format!("- {}: {}\n", key, value));
            }
        }
        out.push('\n');
    }

    fn conclusion(&self, out: &mut String, conclusion: &str) {
        out.push_str(&format!("# Synthesized Conclusion\n\n{}\n", conclusion));
    }
}

struct TextLayout;

impl Layout for TextLayout {
    fn question(&self, out: &mut String, question: &str) {
        out.push_str("Your Question\n\n");
        if !question.is_empty() {
            out.push_str(&format!("{}\n\n", question));
        }
    }

    fn answers_heading(&self, out: &mut String) {
        out.push_str("Perspectives & Answers\n\n");
    }

    fn answer(&self, out: &mut String, answer: &Answer) {
        out.push_str(&format!("{}\n", answer.perspective));
        if !answer.text.is_empty() {
            out.push_str(&format!("{}\n", answer.text));
        }
        if !answer.metadata.is_empty() {
            out.push_str("\nMetadata:\n");
            for (key, value) in &answer.metadata {
                out.push_str(&format!("- {}: {}\n", key, value));
            }
        }
        out.push('\n');
    }

    fn conclusion(&self, out: &mut String, conclusion: &str) {
        out.push_str(&format!("Synthesized Conclusion\n\n{}\n", conclusion));
    }
}

struct HtmlLayout {
    escape: EscapePolicy,
}

impl HtmlLayout {
    fn text<'a>(&self, s: &'a str) -> Cow<'a, str> {
        match self.escape {
            EscapePolicy::Verbatim => Cow::Borrowed(s),
            EscapePolicy::Html => html_escape::encode_quoted_attribute(s),
        }
    }
}

impl Layout for HtmlLayout {
    fn question(&self, out: &mut String, question: &str) {
        out.push_str("<h1>Your Question</h1>\n");
        if !question.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", self.text(question)));
        }
    }

    fn answers_heading(&self, out: &mut String) {
        out.push_str("<h2>Perspectives & Answers</h2>\n");
    }

    fn answer(&self, out: &mut String, answer: &Answer) {
        out.push_str(&format!("<h3>{}</h3>\n", self.text(answer.perspective.as_str())));
        if !answer.text.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", self.text(&answer.text)));
        }
        if !answer.metadata.is_empty() {
            out.push_str("<ul>\n");
            for (key, value) in &answer.metadata {
                out.push_str(&format!(
                    "<li><strong>{}:</strong> {}</li>\n",
                    self.text(key),
                    self.text(&value.to_string())
                ));
            }
            out.push_str("</ul>\n");
        }
    }

    fn conclusion(&self, out: &mut String, conclusion: &str) {
        out.push_str(&format!(
            "<h2>Synthesized Conclusion</h2>\n<p>{}</p>\n",
            self.text(conclusion)
        ));
    }
}

/// Renders sessions into export documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportRenderer {
    escape: EscapePolicy,
}

impl ExportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escaping applies to the HTML format only
    pub fn with_escape(mut self, escape: EscapePolicy) -> Self {
        self.escape = escape;
        self
    }

    pub fn render<'a>(
        &self,
        format: ExportFormat,
        question: &str,
        answers: impl IntoIterator<Item = &'a Answer>,
        conclusion: Option<&str>,
    ) -> ExportDocument {
        let html;
        let layout: &dyn Layout = match format {
            ExportFormat::Markdown => &MarkdownLayout,
            ExportFormat::Text => &TextLayout,
            ExportFormat::Html => {
                html = HtmlLayout {
                    escape: self.escape,
                };
                &html
            }
        };

        let mut content = String::new();
        layout.question(&mut content, question);

        let mut answers = answers.into_iter().peekable();
        if answers.peek().is_some() {
            layout.answers_heading(&mut content);
            for answer in answers {
                layout.answer(&mut content, answer);
            }
        }

        if let Some(conclusion) = conclusion.filter(|c| !c.is_empty()) {
            layout.conclusion(&mut content, conclusion);
        }

        ExportDocument {
            content,
            mime_type: format.mime_type(),
            filename: format.filename(),
        }
    }

    /// Render the current contents of a session
    pub fn render_state(&self, format: ExportFormat, state: &SessionState) -> ExportDocument {
        self.render(
            format,
            state.question().content(),
            state.answers().iter(),
            state.conclusion().map(|c| c.text.as_str()),
        )
    }
}
