//! Actions accepted by the session reducer

use super::answer::Answer;
use super::conclusion::Conclusion;
use super::state::SessionEpoch;
use crate::catalog::perspective::{PerspectiveCatalog, PerspectiveId};
use crate::catalog::provider::{ModelId, Provider, ProviderCatalog};
use crate::core::error::SessionError;

/// Everything that can happen to a session
///
/// User intents come first; the `*Loaded` / `*Completed` variants carry
/// results of effects back into the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Edit the draft question (ignored once submitted)
    SetQuestion(String),
    SubmitQuestion,
    /// Expand or collapse the submitted question
    ToggleQuestionDetail,
    SelectPerspective(PerspectiveId),
    SelectProvider(Provider),
    SelectModel(ModelId),
    SelectTab(PerspectiveId),
    RemoveAnswer(PerspectiveId),
    DismissError,
    /// "Ask another question"
    Reset,

    LoadPerspectives,
    PerspectivesLoaded(Result<PerspectiveCatalog, SessionError>),
    LoadProviders,
    ProvidersLoaded(Result<ProviderCatalog, SessionError>),
    ModelsLoaded {
        provider: Provider,
        result: Result<Vec<ModelId>, SessionError>,
    },

    RequestAnswer,
    AnswerCompleted {
        epoch: SessionEpoch,
        result: Result<Answer, SessionError>,
    },
    RequestConclusion,
    ConclusionCompleted {
        epoch: SessionEpoch,
        result: Result<Conclusion, SessionError>,
    },
}

impl SessionAction {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::SetQuestion(_) => "set_question",
            SessionAction::SubmitQuestion => "submit_question",
            SessionAction::ToggleQuestionDetail => "toggle_question_detail",
            SessionAction::SelectPerspective(_) => "select_perspective",
            SessionAction::SelectProvider(_) => "select_provider",
            SessionAction::SelectModel(_) => "select_model",
            SessionAction::SelectTab(_) => "select_tab",
            SessionAction::RemoveAnswer(_) => "remove_answer",
            SessionAction::DismissError => "dismiss_error",
            SessionAction::Reset => "reset",
            SessionAction::LoadPerspectives => "load_perspectives",
            SessionAction::PerspectivesLoaded(_) => "perspectives_loaded",
            SessionAction::LoadProviders => "load_providers",
            SessionAction::ProvidersLoaded(_) => "providers_loaded",
            SessionAction::ModelsLoaded { .. } => "models_loaded",
            SessionAction::RequestAnswer => "request_answer",
            SessionAction::AnswerCompleted { .. } => "answer_completed",
            SessionAction::RequestConclusion => "request_conclusion",
            SessionAction::ConclusionCompleted { .. } => "conclusion_completed",
        }
    }
}
