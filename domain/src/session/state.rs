//! Session state aggregate
//!
//! [`SessionState`] is a plain value. It is only ever advanced by
//! [`reduce`](super::reducer::reduce), which consumes the old state and
//! returns the next one; the fields are therefore crate-private and exposed
//! through read-only accessors.

use super::action::SessionAction;
use super::answer::{Answer, AnswerSet};
use super::conclusion::Conclusion;
use crate::catalog::perspective::{PerspectiveCatalog, PerspectiveId};
use crate::catalog::provider::{ModelId, Provider, ProviderCatalog};
use crate::core::error::SessionError;
use crate::core::question::Question;

/// Monotonic session counter, bumped on every reset.
///
/// Every generation request carries the epoch it was issued in; a response
/// whose epoch is no longer current belongs to an abandoned session and is
/// discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asynchronous operations a session can have in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    Perspectives,
    Providers,
    Models,
    Answer,
    Conclusion,
}

impl RequestSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSlot::Perspectives => "perspectives",
            RequestSlot::Providers => "providers",
            RequestSlot::Models => "models",
            RequestSlot::Answer => "answer",
            RequestSlot::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for RequestSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-operation loading flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub perspectives: bool,
    pub providers: bool,
    pub models: bool,
    pub answer: bool,
    pub conclusion: bool,
}

impl LoadingFlags {
    pub fn get(&self, slot: RequestSlot) -> bool {
        match slot {
            RequestSlot::Perspectives => self.perspectives,
            RequestSlot::Providers => self.providers,
            RequestSlot::Models => self.models,
            RequestSlot::Answer => self.answer,
            RequestSlot::Conclusion => self.conclusion,
        }
    }

    pub(crate) fn set(&mut self, slot: RequestSlot, value: bool) {
        match slot {
            RequestSlot::Perspectives => self.perspectives = value,
            RequestSlot::Providers => self.providers = value,
            RequestSlot::Models => self.models = value,
            RequestSlot::Answer => self.answer = value,
            RequestSlot::Conclusion => self.conclusion = value,
        }
    }

    pub fn any(&self) -> bool {
        self.perspectives || self.providers || self.models || self.answer || self.conclusion
    }
}

/// Everything one council session knows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(crate) question: Question,
    pub(crate) submitted: bool,
    pub(crate) question_detail_open: bool,
    pub(crate) perspectives: Option<PerspectiveCatalog>,
    pub(crate) providers: Option<ProviderCatalog>,
    pub(crate) selected_perspective: Option<PerspectiveId>,
    pub(crate) selected_provider: Option<Provider>,
    pub(crate) selected_model: Option<ModelId>,
    pub(crate) answers: AnswerSet,
    pub(crate) active_tab: Option<PerspectiveId>,
    pub(crate) conclusion: Option<Conclusion>,
    pub(crate) error: Option<SessionError>,
    pub(crate) error_slot: Option<RequestSlot>,
    pub(crate) loading: LoadingFlags,
    /// Provider of the latest model-list fetch still outstanding
    pub(crate) models_request: Option<Provider>,
    pub(crate) epoch: SessionEpoch,
}

impl SessionState {
    /// Empty session with no catalogs loaded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_question_detail_open(&self) -> bool {
        self.question_detail_open
    }

    pub fn perspectives(&self) -> Option<&PerspectiveCatalog> {
        self.perspectives.as_ref()
    }

    pub fn providers(&self) -> Option<&ProviderCatalog> {
        self.providers.as_ref()
    }

    pub fn selected_perspective(&self) -> Option<&PerspectiveId> {
        self.selected_perspective.as_ref()
    }

    pub fn selected_provider(&self) -> Option<&Provider> {
        self.selected_provider.as_ref()
    }

    pub fn selected_model(&self) -> Option<&ModelId> {
        self.selected_model.as_ref()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn active_tab(&self) -> Option<&PerspectiveId> {
        self.active_tab.as_ref()
    }

    /// Answer shown in the active tab
    pub fn active_answer(&self) -> Option<&Answer> {
        self.active_tab.as_ref().and_then(|p| self.answers.get(p))
    }

    pub fn conclusion(&self) -> Option<&Conclusion> {
        self.conclusion.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Request that raised the current error
    pub fn error_slot(&self) -> Option<RequestSlot> {
        self.error_slot
    }

    /// Action that re-issues the request behind the current error
    pub fn retry_action(&self) -> Option<SessionAction> {
        match self.error_slot? {
            RequestSlot::Perspectives => Some(SessionAction::LoadPerspectives),
            RequestSlot::Providers => Some(SessionAction::LoadProviders),
            RequestSlot::Models => self
                .selected_provider
                .clone()
                .map(SessionAction::SelectProvider),
            RequestSlot::Answer => Some(SessionAction::RequestAnswer),
            RequestSlot::Conclusion => Some(SessionAction::RequestConclusion),
        }
    }

    pub fn loading(&self) -> LoadingFlags {
        self.loading
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// Models of the selected provider
    pub fn available_models(&self) -> &[ModelId] {
        match (&self.providers, &self.selected_provider) {
            (Some(catalog), Some(provider)) => catalog.models_for(provider),
            _ => &[],
        }
    }

    /// Description of the selected perspective
    pub fn selected_description(&self) -> Option<&str> {
        let id = self.selected_perspective.as_ref()?;
        self.perspectives.as_ref().map(|c| c.description(id))
    }

    pub fn can_submit(&self) -> bool {
        !self.submitted && self.question.is_submittable()
    }

    /// Preconditions of the generate-answer trigger
    pub fn can_generate_answer(&self) -> bool {
        self.submitted
            && self.question.is_submittable()
            && self.selected_perspective.is_some()
            && self.selected_provider.is_some()
            && self.selected_model.is_some()
            && !self.loading.answer
    }

    /// Preconditions of the synthesize trigger
    pub fn can_synthesize(&self) -> bool {
        self.answers.len() > 1
            && self.selected_provider.is_some()
            && self.selected_model.is_some()
            && !self.loading.conclusion
    }

    /// True when the conclusion was built from answers that have since been
    /// regenerated, removed or supplemented.
    ///
    /// The conclusion itself is never invalidated; this only lets a front
    /// end point out the difference.
    pub fn conclusion_is_stale(&self) -> bool {
        match &self.conclusion {
            Some(conclusion) if !conclusion.sources.is_empty() => {
                conclusion.sources != self.answers.revisions()
            }
            _ => false,
        }
    }
}
