//! Console output formatter for council sessions

use colored::Colorize;
use council_domain::{
    Answer, Conclusion, PerspectiveCatalog, ProviderCatalog, SessionError, SessionState,
};

/// Formats session contents for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors on or off for everything printed afterwards
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Question, every answer and the conclusion
    pub fn format_session(state: &SessionState) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Council Session"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            state.question().content()
        ));

        if state.answers().is_empty() {
            output.push_str(&format!("\n{}\n", "No answers yet.".dimmed()));
        }
        for answer in state.answers().iter() {
            let active = state.active_tab() == Some(&answer.perspective);
            output.push_str(&Self::format_answer(answer, active));
        }

        if let Some(conclusion) = state.conclusion() {
            output.push_str(&Self::format_conclusion(conclusion, state.conclusion_is_stale()));
        }

        output.push_str(&Self::footer());
        output
    }

    /// One answer block; `active` marks the selected tab
    pub fn format_answer(answer: &Answer, active: bool) -> String {
        let marker = if active { "▸ " } else { "" };
        let title = format!(
            "── {}{} ── {} · {}",
            marker,
            answer.perspective,
            answer.provider_used.label(),
            answer.model_used
        );
        format!("\n{}\n{}\n", title.yellow().bold(), answer.text)
    }

    pub fn format_conclusion(conclusion: &Conclusion, stale: bool) -> String {
        let mut output = Self::section_header("Synthesized Conclusion");
        output.push_str(&format!(
            "{}\n\n{}\n",
            format!("Model: {}", conclusion.model_used).dimmed(),
            conclusion.text
        ));
        if stale {
            output.push_str(&format!(
                "\n{}\n",
                "Answers changed since this conclusion was synthesized (/conclude to refresh)."
                    .yellow()
            ));
        }
        output
    }

    /// Perspective list; `selected` is highlighted
    pub fn format_perspectives(catalog: &PerspectiveCatalog, state: &SessionState) -> String {
        let mut output = Self::section_header("Perspectives");
        for (index, perspective) in catalog.iter().enumerate() {
            let selected = state.selected_perspective() == Some(&perspective.id);
            let answered = state.answers().contains(&perspective.id);
            let name = if selected {
                perspective.id.to_string().green().bold()
            } else {
                perspective.id.to_string().normal()
            };
            output.push_str(&format!(
                "{:>3}. {}{}\n     {}\n",
                index + 1,
                name,
                if answered { " ✓".green().to_string() } else { String::new() },
                perspective.description.dimmed()
            ));
        }
        output
    }

    pub fn format_providers(catalog: &ProviderCatalog, state: &SessionState) -> String {
        let mut output = Self::section_header("Providers");
        for (provider, available) in catalog.availability() {
            let status = if *available {
                "available".green()
            } else {
                "unavailable".red()
            };
            let selected = if state.selected_provider() == Some(provider) {
                " (selected)"
            } else {
                ""
            };
            output.push_str(&format!(
                "  {:<10} {:<20} {}{}\n",
                provider.as_str(),
                provider.label(),
                status,
                selected.cyan()
            ));
            if *available && provider.sends_data_to_third_party() {
                output.push_str(&format!(
                    "             {}\n",
                    "questions are sent to a third-party service".dimmed()
                ));
            }
        }
        output
    }

    pub fn format_models(state: &SessionState) -> String {
        let mut output = Self::section_header("Models");
        let models = state.available_models();
        if models.is_empty() {
            output.push_str(&format!("  {}\n", "No models available.".dimmed()));
        }
        for model in models {
            let marker = if state.selected_model() == Some(model) {
                "*".green().bold()
            } else {
                " ".normal()
            };
            output.push_str(&format!("  {} {}\n", marker, model));
        }
        output
    }

    /// Selection, loading flags and error in a few lines
    pub fn format_status(state: &SessionState) -> String {
        let none = || "-".dimmed().to_string();
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan(),
            if state.is_submitted() {
                state.question().preview()
            } else {
                format!("{} (draft)", state.question().preview())
            }
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Perspective:".cyan(),
            state
                .selected_perspective()
                .map(|p| p.to_string())
                .unwrap_or_else(none)
        ));
        output.push_str(&format!(
            "{} {} / {}\n",
            "Provider/model:".cyan(),
            state
                .selected_provider()
                .map(|p| p.label().to_string())
                .unwrap_or_else(none),
            state
                .selected_model()
                .map(|m| m.to_string())
                .unwrap_or_else(none)
        ));
        output.push_str(&format!(
            "{} {}   {} {}\n",
            "Answers:".cyan(),
            state.answers().len(),
            "Conclusion:".cyan(),
            if state.conclusion().is_some() { "yes" } else { "no" }
        ));
        if let Some(error) = state.error() {
            output.push_str(&Self::format_error(error));
        }
        output
    }

    pub fn format_error(error: &SessionError) -> String {
        let hint = if error.is_retryable() {
            " (/retry or /dismiss)"
        } else {
            ""
        };
        format!("{} {}{}\n", "Error:".red().bold(), error, hint.dimmed())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
