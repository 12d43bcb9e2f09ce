//! REPL (Read-Eval-Print Loop) for interactive council sessions

use super::commands::ReplCommand;
use crate::output::console::ConsoleFormatter;
use crate::output::export::ExportRenderer;
use council_application::CouncilSession;
use council_domain::{
    Answer, Conclusion, ExportFormat, ModelId, PerspectiveId, Provider, RequestSlot,
    SessionAction, SessionError, SessionState,
};
use council_domain::EXAMPLE_QUESTIONS;
use rand::Rng;
use rand::seq::SliceRandom;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Interactive session REPL
pub struct SessionRepl {
    session: Arc<CouncilSession>,
    renderer: ExportRenderer,
    export_format: ExportFormat,
}

impl SessionRepl {
    pub fn new(session: Arc<CouncilSession>) -> Self {
        Self {
            session,
            renderer: ExportRenderer::new(),
            export_format: ExportFormat::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: ExportRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Format used by `/export` without an argument
    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    fn history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("council").join("history.txt"))
    }

    fn editor() -> Reedline {
        let editor = Reedline::create();
        let Some(path) = Self::history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("REPL history disabled: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = Self::editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("council".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match ReplCommand::parse(line) {
                        Ok(ReplCommand::Quit) => {
                            println!("Bye!");
                            break;
                        }
                        Ok(command) => self.handle(command).await,
                        Err(e) => {
                            println!("{}", e);
                            println!("Type /help for available commands");
                        }
                    }
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                Signal::CtrlC => {
                    println!("^C");
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        let state = self.session.snapshot();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Council - Session              │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if let Some(catalog) = state.perspectives() {
            println!("{} perspectives loaded.", catalog.len());
        }
        print!("{}", ConsoleFormatter::format_status(&state));
        println!();
        println!("Type your question, or /help for commands.");
        println!();
    }

    async fn handle(&self, command: ReplCommand) {
        match command {
            ReplCommand::Help => println!("{}", ReplCommand::help_text()),
            ReplCommand::Perspectives => {
                let state = self.session.snapshot();
                match state.perspectives() {
                    Some(catalog) => {
                        print!("{}", ConsoleFormatter::format_perspectives(catalog, &state))
                    }
                    None => println!("Perspectives are not loaded."),
                }
            }
            ReplCommand::Providers => {
                let state = self.session.snapshot();
                match state.providers() {
                    Some(catalog) => {
                        print!("{}", ConsoleFormatter::format_providers(catalog, &state))
                    }
                    None => println!("Providers are not loaded."),
                }
            }
            ReplCommand::Models => print!("{}", ConsoleFormatter::format_models(&self.session.snapshot())),
            ReplCommand::Question(text) => self.ask_question(text).await,
            ReplCommand::Example => {
                if self.session.snapshot().is_submitted() {
                    println!("A question is already submitted. Use /reset to ask another one.");
                    return;
                }
                let example = pick_example(&mut rand::thread_rng());
                self.dispatch(SessionAction::SetQuestion(example.to_string())).await;
                println!("{}", example);
                println!("(/submit to ask it, or type your own question)");
            }
            ReplCommand::Submit => self.submit_question().await,
            ReplCommand::Use(name) => {
                self.select_perspective(&name).await;
            }
            ReplCommand::Provider(id) => {
                let provider = Provider::from_id(&id);
                if self.dispatch(SessionAction::SelectProvider(provider)).await {
                    print!("{}", ConsoleFormatter::format_models(&self.session.snapshot()));
                } else {
                    println!("Provider {} is not available.", id);
                }
            }
            ReplCommand::Model(id) => {
                if !self.dispatch(SessionAction::SelectModel(ModelId::new(id.clone()))).await {
                    println!("Model {} is not offered by the selected provider.", id);
                }
            }
            ReplCommand::Ask(perspective) => {
                if let Some(name) = perspective
                    && !self.select_perspective(&name).await
                {
                    return;
                }
                self.generate_answer().await;
            }
            ReplCommand::Tab(name) => match self.resolve_perspective(&name) {
                Some(id) => {
                    if self.dispatch(SessionAction::SelectTab(id)).await {
                        self.print_active_answer();
                    } else {
                        println!("No answer for {} yet.", name);
                    }
                }
                None => println!("Unknown perspective: {}", name),
            },
            ReplCommand::Remove(name) => match self.resolve_perspective(&name) {
                Some(id) => {
                    if self.dispatch(SessionAction::RemoveAnswer(id.clone())).await {
                        println!("Removed the {} answer.", id);
                    } else {
                        println!("No answer for {} to remove.", name);
                    }
                }
                None => println!("Unknown perspective: {}", name),
            },
            ReplCommand::Conclude => self.synthesize().await,
            ReplCommand::Show => print!("{}", ConsoleFormatter::format_session(&self.session.snapshot())),
            ReplCommand::Detail => {
                self.dispatch(SessionAction::ToggleQuestionDetail).await;
                let state = self.session.snapshot();
                if state.is_question_detail_open() {
                    println!("{}", state.question().content());
                } else {
                    println!("{}", state.question().preview());
                }
            }
            ReplCommand::Export { format, path } => self.export(format, path),
            ReplCommand::Dismiss => {
                self.dispatch(SessionAction::DismissError).await;
            }
            ReplCommand::Retry => match self.session.snapshot().retry_action() {
                Some(SessionAction::RequestAnswer) => self.generate_answer().await,
                Some(SessionAction::RequestConclusion) => self.synthesize().await,
                Some(action) => {
                    self.dispatch(action).await;
                }
                None => println!("Nothing to retry."),
            },
            ReplCommand::Reset => {
                self.dispatch(SessionAction::Reset).await;
                println!("Ready for another question.");
            }
            ReplCommand::Status => print!("{}", ConsoleFormatter::format_status(&self.session.snapshot())),
            ReplCommand::Quit => {}
        }
    }

    /// Dispatch and report any error the action left behind.
    ///
    /// A request that fails again leaves an identical error in place, so a
    /// request's own slot is checked instead of comparing errors.
    async fn dispatch(&self, action: SessionAction) -> bool {
        let slot = issued_request(&action);
        let before = self.session.snapshot().error().cloned();
        let changed = self.session.dispatch(action).await;
        let state = self.session.snapshot();
        if let Some(error) = state.error() {
            let own_failure = changed && slot.is_some() && state.error_slot() == slot;
            if own_failure || before.as_ref() != Some(error) {
                print!("{}", ConsoleFormatter::format_error(error));
            }
        }
        changed
    }

    async fn ask_question(&self, text: String) {
        if self.session.snapshot().is_submitted() {
            println!("A question is already submitted. Use /reset to ask another one.");
            return;
        }
        self.dispatch(SessionAction::SetQuestion(text)).await;
        self.submit_question().await;
    }

    async fn submit_question(&self) {
        if self.session.snapshot().is_submitted() {
            println!("A question is already submitted. Use /reset to ask another one.");
            return;
        }
        if !self.dispatch(SessionAction::SubmitQuestion).await {
            println!("The question is empty.");
            return;
        }
        let state = self.session.snapshot();
        if let Some(id) = state.selected_perspective() {
            println!(
                "Question submitted. Perspective: {} (/use to change, /ask to generate)",
                id
            );
        }
    }

    /// Perspective by exact name, case-insensitive name or 1-based index
    fn resolve_perspective(&self, name: &str) -> Option<PerspectiveId> {
        let state = self.session.snapshot();
        let catalog = state.perspectives()?;
        if let Ok(index) = name.parse::<usize>() {
            return catalog.ids().nth(index.checked_sub(1)?).cloned();
        }
        catalog.find(name).cloned()
    }

    async fn select_perspective(&self, name: &str) -> bool {
        let Some(id) = self.resolve_perspective(name) else {
            println!("Unknown perspective: {}", name);
            return false;
        };
        if !self.dispatch(SessionAction::SelectPerspective(id.clone())).await {
            println!("Cannot select {} right now.", id);
            return false;
        }
        if let Some(description) = self.session.snapshot().selected_description() {
            println!("{}: {}", id, description);
        }
        true
    }

    async fn generate_answer(&self) {
        let state = self.session.snapshot();
        if !state.can_generate_answer() {
            println!("{}", generate_blocker(&state));
            return;
        }
        let Some(requested) = state.selected_perspective().cloned() else {
            return;
        };
        if !self.session.dispatch(SessionAction::RequestAnswer).await {
            println!("{}", generate_blocker(&self.session.snapshot()));
            return;
        }
        let state = self.session.snapshot();
        match answer_outcome(&state, &requested) {
            Outcome::Failed(error) => print!("{}", ConsoleFormatter::format_error(error)),
            Outcome::Answer(answer) => print!("{}", ConsoleFormatter::format_answer(answer, true)),
            Outcome::Conclusion(..) | Outcome::Nothing => {
                println!("No answer was recorded for {}.", requested)
            }
        }
    }

    async fn synthesize(&self) {
        let state = self.session.snapshot();
        if !state.can_synthesize() {
            println!("{}", synthesize_blocker(&state));
            return;
        }
        if !self.session.dispatch(SessionAction::RequestConclusion).await {
            println!("{}", synthesize_blocker(&self.session.snapshot()));
            return;
        }
        let state = self.session.snapshot();
        match conclusion_outcome(&state) {
            Outcome::Failed(error) => print!("{}", ConsoleFormatter::format_error(error)),
            Outcome::Conclusion(conclusion, stale) => {
                print!("{}", ConsoleFormatter::format_conclusion(conclusion, stale))
            }
            Outcome::Answer(_) | Outcome::Nothing => println!("No conclusion was recorded."),
        }
    }

    fn print_active_answer(&self) {
        if let Some(answer) = self.session.snapshot().active_answer() {
            print!("{}", ConsoleFormatter::format_answer(answer, true));
        }
    }

    fn export(&self, format: Option<ExportFormat>, path: Option<PathBuf>) {
        let state = self.session.snapshot();
        let document = self
            .renderer
            .render_state(format.unwrap_or(self.export_format), &state);
        let path = path.unwrap_or_else(|| PathBuf::from("."));
        if path.as_os_str() == "-" {
            print!("{}", document.content);
            return;
        }
        match document.save(&path) {
            Ok(written) => println!("Exported to {}", written.display()),
            Err(e) => println!("Export failed: {}", e),
        }
    }
}

/// What a finished answer or conclusion request left in the session
#[derive(Debug, PartialEq)]
enum Outcome<'a> {
    Failed(&'a SessionError),
    Answer(&'a Answer),
    Conclusion(&'a Conclusion, bool),
    Nothing,
}

/// Result of an answer request for `requested`
fn answer_outcome<'a>(state: &'a SessionState, requested: &PerspectiveId) -> Outcome<'a> {
    if state.error_slot() == Some(RequestSlot::Answer)
        && let Some(error) = state.error()
    {
        return Outcome::Failed(error);
    }
    match state.active_answer() {
        Some(answer) if &answer.perspective == requested => Outcome::Answer(answer),
        _ => Outcome::Nothing,
    }
}

/// Result of a conclusion request
fn conclusion_outcome(state: &SessionState) -> Outcome<'_> {
    if state.error_slot() == Some(RequestSlot::Conclusion)
        && let Some(error) = state.error()
    {
        return Outcome::Failed(error);
    }
    match state.conclusion() {
        Some(conclusion) => Outcome::Conclusion(conclusion, state.conclusion_is_stale()),
        None => Outcome::Nothing,
    }
}

fn pick_example(rng: &mut impl Rng) -> &'static str {
    EXAMPLE_QUESTIONS
        .choose(rng)
        .copied()
        .unwrap_or("What makes a life meaningful?")
}

/// Slot of the request an action issues, if any
fn issued_request(action: &SessionAction) -> Option<RequestSlot> {
    match action {
        SessionAction::LoadPerspectives => Some(RequestSlot::Perspectives),
        SessionAction::LoadProviders => Some(RequestSlot::Providers),
        SessionAction::SelectProvider(_) => Some(RequestSlot::Models),
        SessionAction::RequestAnswer => Some(RequestSlot::Answer),
        SessionAction::RequestConclusion => Some(RequestSlot::Conclusion),
        _ => None,
    }
}

/// Why the generate trigger is disabled
fn generate_blocker(state: &SessionState) -> &'static str {
    if !state.is_submitted() {
        "Submit a question first."
    } else if state.selected_perspective().is_none() {
        "Select a perspective first (/use)."
    } else if state.selected_provider().is_none() {
        "No provider selected (/providers)."
    } else if state.selected_model().is_none() {
        "No model selected (/models)."
    } else {
        "An answer is already being generated."
    }
}

/// Why the synthesize trigger is disabled
fn synthesize_blocker(state: &SessionState) -> &'static str {
    if state.answers().len() < 2 {
        "At least two answers are needed for a conclusion."
    } else if state.selected_provider().is_none() || state.selected_model().is_none() {
        "Select a provider and model first."
    } else {
        "A conclusion is already being synthesized."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_blocker_names_first_missing_step() {
        let state = SessionState::new();
        assert_eq!(generate_blocker(&state), "Submit a question first.");
        assert_eq!(
            synthesize_blocker(&state),
            "At least two answers are needed for a conclusion."
        );
    }

    fn apply(state: SessionState, action: SessionAction) -> SessionState {
        council_domain::reduce(state, action).state
    }

    fn submitted() -> SessionState {
        let state = apply(
            SessionState::new(),
            SessionAction::PerspectivesLoaded(Ok(council_domain::PerspectiveCatalog::from_pairs([
                ("Zen", "Sit."),
                ("Stoicism", "Endure."),
            ]))),
        );
        let state = apply(
            state,
            SessionAction::ProvidersLoaded(Ok(council_domain::ProviderCatalog::new([(
                Provider::Local,
                true,
            )])
            .with_models(Provider::Local, vec!["m1".into()]))),
        );
        let state = apply(state, SessionAction::SetQuestion("Why?".into()));
        apply(state, SessionAction::SubmitQuestion)
    }

    fn answer(state: SessionState, perspective: &str, ok: bool) -> SessionState {
        let state = apply(state, SessionAction::SelectPerspective(perspective.into()));
        let state = apply(state, SessionAction::RequestAnswer);
        let epoch = state.epoch();
        let result = if ok {
            Ok(Answer::new(perspective, format!("{} says", perspective), Provider::Local, "m1"))
        } else {
            Err(SessionError::answer_failed())
        };
        apply(state, SessionAction::AnswerCompleted { epoch, result })
    }

    #[test]
    fn test_repeated_answer_failure_is_reported_each_time() {
        let stoicism = PerspectiveId::new("Stoicism");
        let state = answer(submitted(), "Zen", true);

        let state = answer(state, "Stoicism", false);
        assert_eq!(
            answer_outcome(&state, &stoicism),
            Outcome::Failed(&SessionError::answer_failed())
        );

        // identical error again; the earlier Zen answer must not be shown
        let state = answer(state, "Stoicism", false);
        assert_eq!(state.active_tab(), Some(&PerspectiveId::new("Zen")));
        assert_eq!(
            answer_outcome(&state, &stoicism),
            Outcome::Failed(&SessionError::answer_failed())
        );
    }

    #[test]
    fn test_answer_outcome_only_shows_requested_perspective() {
        let state = answer(submitted(), "Zen", true);
        let zen = PerspectiveId::new("Zen");
        assert!(matches!(answer_outcome(&state, &zen), Outcome::Answer(a) if a.perspective == zen));
        assert_eq!(
            answer_outcome(&state, &PerspectiveId::new("Stoicism")),
            Outcome::Nothing
        );
    }

    #[test]
    fn test_repeated_conclusion_failure_is_reported_each_time() {
        let mut state = answer(answer(submitted(), "Zen", true), "Stoicism", true);
        for _ in 0..2 {
            state = apply(state, SessionAction::RequestConclusion);
            let epoch = state.epoch();
            state = apply(
                state,
                SessionAction::ConclusionCompleted {
                    epoch,
                    result: Err(SessionError::conclusion_failed()),
                },
            );
            assert_eq!(
                conclusion_outcome(&state),
                Outcome::Failed(&SessionError::conclusion_failed())
            );
        }
    }

    #[test]
    fn test_example_is_a_submittable_question() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let example = pick_example(&mut rng);
            assert!(EXAMPLE_QUESTIONS.contains(&example));
            let state = apply(SessionState::new(), SessionAction::SetQuestion(example.into()));
            assert!(state.can_submit());
        }
    }

    #[test]
    fn test_request_slots_of_actions() {
        assert_eq!(
            issued_request(&SessionAction::SelectProvider(Provider::Local)),
            Some(RequestSlot::Models)
        );
        assert_eq!(issued_request(&SessionAction::DismissError), None);
    }
}
